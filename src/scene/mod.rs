//! Scene graph snapshot returned by the `debug/scenedump` method.

pub mod render;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IpcError, Result};
use crate::transport::protocol::check_remote_error;

/// Node identifier. Current compositors send a stringified pointer, older
/// ones a number; both are printed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Node-local bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// One node of the scene graph. `children` keep the compositor's paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub id: NodeId,
    #[serde(rename = "local-bbox")]
    pub local_bbox: Rect,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Decode a scene dump response.
    ///
    /// Missing `name`, `id` or `local-bbox` (or any bbox coordinate) anywhere
    /// in the tree is an `IpcError::MalformedPayload`; no defaults are filled
    /// in for them.
    pub fn from_value(value: Value) -> Result<Self> {
        let value = check_remote_error(value)?;
        serde_json::from_value(value).map_err(|e| IpcError::MalformedPayload(e.to_string()))
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(name: &str, id: u64, children: Vec<Value>) -> Value {
        json!({
            "name": name,
            "id": id,
            "local-bbox": {"x": 0, "y": 0, "width": 10, "height": 20},
            "children": children,
        })
    }

    #[test]
    fn decodes_nested_tree_in_order() {
        let value = node(
            "root ()",
            1,
            vec![node("b", 2, vec![]), node("a", 3, vec![node("c", 4, vec![])])],
        );
        let root = SceneNode::from_value(value).unwrap();

        assert_eq!(root.node_count(), 4);
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(root.children[1].children[0].id, NodeId::Number(4.into()));
        assert_eq!(root.local_bbox.height, 20);
    }

    #[test]
    fn pointer_ids_are_kept_as_text() {
        let value = json!({
            "name": "output DP-1",
            "id": "0x55d0c2a4f0e0",
            "local-bbox": {"x": -5, "y": 0, "width": 1920, "height": 1080},
            "children": []
        });
        let node = SceneNode::from_value(value).unwrap();
        assert_eq!(node.id.to_string(), "0x55d0c2a4f0e0");
        assert_eq!(node.local_bbox.x, -5);
    }

    #[test]
    fn missing_children_means_leaf() {
        let value = json!({
            "name": "leaf",
            "id": 9,
            "local-bbox": {"x": 0, "y": 0, "width": 0, "height": 0}
        });
        assert!(SceneNode::from_value(value).unwrap().children.is_empty());
    }

    #[test]
    fn missing_name_is_malformed() {
        let value = json!({
            "id": 1,
            "local-bbox": {"x": 0, "y": 0, "width": 0, "height": 0},
            "children": []
        });
        assert!(matches!(
            SceneNode::from_value(value),
            Err(IpcError::MalformedPayload(_))
        ));
    }

    #[test]
    fn any_numeric_id_is_accepted() {
        let mut value = node("n", 1, vec![]);
        value["id"] = json!(-1);
        assert_eq!(SceneNode::from_value(value.clone()).unwrap().id.to_string(), "-1");

        value["id"] = json!(1.5);
        assert_eq!(SceneNode::from_value(value).unwrap().id.to_string(), "1.5");
    }

    #[test]
    fn missing_id_is_malformed() {
        let mut value = node("n", 1, vec![]);
        value.as_object_mut().unwrap().remove("id");
        let err = SceneNode::from_value(value).unwrap_err();
        assert!(matches!(err, IpcError::MalformedPayload(ref m) if m.contains("id")));
    }

    #[test]
    fn missing_bbox_is_malformed() {
        let mut value = node("root ()", 1, vec![node("child", 2, vec![])]);
        value["children"][0]
            .as_object_mut()
            .unwrap()
            .remove("local-bbox");
        let err = SceneNode::from_value(value).unwrap_err();
        assert!(matches!(err, IpcError::MalformedPayload(ref m) if m.contains("local-bbox")));
    }

    #[test]
    fn missing_bbox_coordinate_in_child_is_malformed() {
        let mut value = node("root ()", 1, vec![node("child", 2, vec![])]);
        value["children"][0]["local-bbox"]
            .as_object_mut()
            .unwrap()
            .remove("height");
        let err = SceneNode::from_value(value).unwrap_err();
        assert!(matches!(err, IpcError::MalformedPayload(ref m) if m.contains("height")));
    }

    #[test]
    fn bad_id_type_is_malformed() {
        let mut value = node("x", 1, vec![]);
        value["id"] = json!([1, 2]);
        assert!(matches!(
            SceneNode::from_value(value),
            Err(IpcError::MalformedPayload(_))
        ));
    }

    #[test]
    fn remote_error_reply_is_not_a_scene() {
        let value = json!({"error": "No such method found!"});
        assert!(matches!(
            SceneNode::from_value(value),
            Err(IpcError::Remote(_))
        ));
    }
}

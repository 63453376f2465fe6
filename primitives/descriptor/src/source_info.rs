//! Leading comments from `SourceCodeInfo`.
//!
//! Locations are addressed by descriptor paths: a sequence of
//! (field number, index) pairs from the `FileDescriptorProto` down to the
//! element, e.g. `[4, 0, 2, 1]` is the second field of the first message.

use std::collections::HashMap;

use prost_types::SourceCodeInfo;

/// `FileDescriptorProto.message_type`
pub const FILE_MESSAGE: i32 = 4;
/// `FileDescriptorProto.enum_type`
pub const FILE_ENUM: i32 = 5;
/// `FileDescriptorProto.service`
pub const FILE_SERVICE: i32 = 6;
/// `DescriptorProto.field`
pub const MESSAGE_FIELD: i32 = 2;
/// `DescriptorProto.nested_type`
pub const MESSAGE_NESTED: i32 = 3;
/// `DescriptorProto.enum_type`
pub const MESSAGE_ENUM: i32 = 4;
/// `EnumDescriptorProto.value`
pub const ENUM_VALUE: i32 = 2;
/// `ServiceDescriptorProto.method`
pub const SERVICE_METHOD: i32 = 2;

/// Leading comments keyed by descriptor path.
#[derive(Debug, Default)]
pub struct Comments {
    by_path: HashMap<Vec<i32>, String>,
}

impl Comments {
    /// Index the leading comments of `info`.
    pub fn new(info: Option<&SourceCodeInfo>) -> Self {
        let mut by_path = HashMap::new();
        for location in info.map(|i| i.location.as_slice()).unwrap_or_default() {
            let comment = location.leading_comments().trim();
            if !comment.is_empty() {
                by_path.insert(location.path.clone(), comment.to_string());
            }
        }
        Self { by_path }
    }

    /// Comment at `path`, if any.
    pub fn at(&self, path: &[i32]) -> Option<String> { self.by_path.get(path).cloned() }
}

/// `path` extended by one `(field, index)` step.
pub fn child(path: &[i32], field: i32, index: usize) -> Vec<i32> {
    let mut out = Vec::with_capacity(path.len() + 2);
    out.extend_from_slice(path);
    out.push(field);
    out.push(index as i32);
    out
}

#[cfg(test)]
mod tests {
    use prost_types::source_code_info::Location;

    use super::*;

    #[test]
    fn test_comments_by_path() {
        let info = SourceCodeInfo {
            location: vec![
                Location {
                    path: vec![4, 0],
                    leading_comments: Some(" A greeting.\n".to_string()),
                    ..Default::default()
                },
                Location {
                    path: vec![4, 0, 2, 0],
                    leading_comments: Some("   ".to_string()),
                    ..Default::default()
                },
            ],
        };
        let comments = Comments::new(Some(&info));
        assert_eq!(comments.at(&[4, 0]).as_deref(), Some("A greeting."));
        assert_eq!(comments.at(&[4, 0, 2, 0]), None);
        assert_eq!(Comments::new(None).at(&[4, 0]), None);
        assert_eq!(child(&[4, 0], MESSAGE_FIELD, 3), vec![4, 0, 2, 3]);
    }
}

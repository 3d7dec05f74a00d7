//! Descriptive tree of a config resource.
//!
//! Exporting decides how each item and data block is best described from its position and the
//! schema version. Importing only looks at the type each node declares, so a tree converts back to
//! bytes the same way whatever version it was exported with.

use tracing::{debug, instrument, warn};

use crate::{
    dict::DictionaryMapping,
    error::{Error, Result},
    resource::{ConfigResource, SchemaVersion, MAX_DATA_BLOCKS, MAX_ITEMS},
    stride, text,
};

/// One described item or data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNode {
    /// Opaque bytes, rendered as hex
    Binary(Vec<u8>),
    /// UTF-16 text
    Text(String),
    /// Item-level dictionary
    Dict(DictionaryMapping),
    /// Fixed-stride dictionary
    DictData(DictionaryMapping),
    /// Little endian `i32` values
    ListData(Vec<i32>),
}

impl ConfigNode {
    /// Name of the node's type, as used in the `type` attribute
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigNode::Binary(_) => "binary",
            ConfigNode::Text(_) => "text",
            ConfigNode::Dict(_) => "dict",
            ConfigNode::DictData(_) => "dict_data",
            ConfigNode::ListData(_) => "list_data",
        }
    }

    /// Describe bytes as text, or as binary if they are not valid UTF-16
    pub fn text_or_binary(bytes: &[u8]) -> ConfigNode {
        match text::decode(bytes) {
            Ok(text) => ConfigNode::Text(text),
            Err(err) => {
                debug!(%err, "item is not text");
                ConfigNode::Binary(bytes.to_vec())
            }
        }
    }

    /// Describe a data block as a list of integers, or as binary if its size doesn't allow that
    pub fn list_or_binary(bytes: &[u8]) -> ConfigNode {
        if bytes.len() % 4 == 0 {
            ConfigNode::ListData(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            )
        } else {
            ConfigNode::Binary(bytes.to_vec())
        }
    }

    /// Encode the node back into bytes according to its type
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            ConfigNode::Binary(bytes) => Ok(bytes.clone()),
            ConfigNode::Text(s) => Ok(text::encode(s)),
            ConfigNode::Dict(mapping) => mapping.encode_item(),
            ConfigNode::DictData(mapping) => stride::encode(mapping),
            ConfigNode::ListData(values) => Ok(values.iter().flat_map(|v| v.to_le_bytes()).collect()),
        }
    }
}

/// Items and data blocks of a config resource, described
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigTree {
    /// Described items
    pub items: Vec<ConfigNode>,
    /// Described data blocks
    pub data: [Option<ConfigNode>; MAX_DATA_BLOCKS],
}

impl ConfigResource {
    /// Describe the resource as a tree
    #[instrument(skip_all, err, fields(version = %self.version))]
    pub fn to_tree(&self) -> Result<ConfigTree> {
        if self.items.len() > MAX_ITEMS {
            return Err(Error::UnexpectedItemCount(self.items.len()));
        }
        if !self.version.is_known() {
            warn!(
                "unknown schema version {}, using the layout of {}",
                self.version,
                SchemaVersion::V23
            );
        }

        let last_text = self.version.last_text_item();
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| match index {
                1 if self.version.has_dictionary_item() => {
                    DictionaryMapping::decode_item(item).map(ConfigNode::Dict)
                }
                i if i <= last_text => Ok(ConfigNode::text_or_binary(item)),
                _ => Ok(ConfigNode::Binary(item.clone())),
            })
            .collect::<Result<Vec<_>>>()?;

        let mut data: [Option<ConfigNode>; MAX_DATA_BLOCKS] = Default::default();
        for (index, (slot, block)) in data.iter_mut().zip(&self.data).enumerate() {
            let Some(block) = block else {
                continue;
            };
            *slot = Some(if index == 0 && self.version.has_dictionary_data() {
                ConfigNode::DictData(stride::decode(block)?)
            } else {
                ConfigNode::list_or_binary(block)
            });
        }

        Ok(ConfigTree { items, data })
    }

    /// Rebuild a resource from its tree
    pub fn from_tree(tree: &ConfigTree, version: SchemaVersion) -> Result<ConfigResource> {
        let items = tree
            .items
            .iter()
            .map(ConfigNode::to_bytes)
            .collect::<Result<Vec<_>>>()?;

        let mut data: [Option<Vec<u8>>; MAX_DATA_BLOCKS] = Default::default();
        for (slot, node) in data.iter_mut().zip(&tree.data) {
            *slot = node.as_ref().map(ConfigNode::to_bytes).transpose()?;
        }

        Ok(ConfigResource {
            version,
            items,
            data,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{ConfigNode, ConfigTree};
    use crate::{
        dict::{DictEntry, DictionaryMapping},
        error::{Error, Result},
        resource::{ConfigResource, SchemaVersion},
        stride, text,
    };

    fn dict_item() -> Vec<u8> {
        DictionaryMapping::new(vec![DictEntry::new("a".into(), 2)])
            .encode_item()
            .unwrap()
    }

    fn resource(version: SchemaVersion, count: usize) -> ConfigResource {
        let mut items: Vec<Vec<u8>> = (0..count).map(|i| text::encode(&format!("item{i}"))).collect();
        if count > 1 && version.has_dictionary_item() {
            items[1] = dict_item();
        }
        ConfigResource {
            version,
            items,
            ..Default::default()
        }
    }

    fn type_names(tree: &ConfigTree) -> Vec<&'static str> {
        tree.items.iter().map(ConfigNode::type_name).collect()
    }

    #[test]
    fn version_23_layout() -> Result<()> {
        let tree = resource(SchemaVersion::V23, 8).to_tree()?;
        assert_eq!(
            type_names(&tree),
            vec!["text", "dict", "text", "text", "text", "text", "binary", "binary"]
        );
        Ok(())
    }

    #[test]
    fn version_24_layout() -> Result<()> {
        let mut res = resource(SchemaVersion::V24, 8);
        res.data[0] = Some(stride::encode(&DictionaryMapping::new(vec![DictEntry::new(
            "x".into(),
            -5,
        )]))?);
        res.data[1] = Some(vec![1, 0, 0, 0]);

        let tree = res.to_tree()?;
        assert_eq!(
            type_names(&tree),
            vec!["text", "text", "text", "text", "text", "text", "text", "binary"]
        );
        assert!(matches!(tree.data[0], Some(ConfigNode::DictData(_))));
        assert_eq!(tree.data[1], Some(ConfigNode::ListData(vec![1])));
        Ok(())
    }

    #[test]
    fn version_23_never_uses_dict_data() -> Result<()> {
        let mut res = resource(SchemaVersion::V23, 2);
        res.data[0] = Some(vec![0; 8]);
        res.data[2] = Some(vec![1, 2, 3]);

        let tree = res.to_tree()?;
        assert_eq!(tree.data[0], Some(ConfigNode::ListData(vec![0, 0])));
        assert_eq!(tree.data[1], None);
        assert_eq!(tree.data[2], Some(ConfigNode::Binary(vec![1, 2, 3])));
        Ok(())
    }

    #[test]
    fn too_many_items() {
        assert!(matches!(
            resource(SchemaVersion::V23, 11).to_tree(),
            Err(Error::UnexpectedItemCount(11))
        ));
    }

    #[test]
    fn text_falls_back_to_binary() -> Result<()> {
        let mut res = resource(SchemaVersion::V23, 3);
        res.items[0] = vec![0x41, 0x00, 0x42];
        res.items[2] = vec![0x00, 0xDC];

        let tree = res.to_tree()?;
        assert_eq!(tree.items[0], ConfigNode::Binary(vec![0x41, 0x00, 0x42]));
        assert_eq!(tree.items[2], ConfigNode::Binary(vec![0x00, 0xDC]));
        Ok(())
    }

    #[traced_test]
    #[test]
    fn unknown_version_uses_version_23_layout() -> Result<()> {
        let mut res = resource(SchemaVersion::V23, 7);
        res.version = SchemaVersion(30);

        let tree = res.to_tree()?;
        assert_eq!(tree.items[1].type_name(), "dict");
        assert_eq!(tree.items[6].type_name(), "binary");
        assert!(logs_contain("unknown schema version 30"));
        Ok(())
    }

    #[test]
    fn import_follows_node_types() -> Result<()> {
        let tree = ConfigTree {
            items: vec![
                ConfigNode::Text("hi".into()),
                ConfigNode::Binary(vec![0xAB]),
            ],
            data: [Some(ConfigNode::ListData(vec![-1])), None, None, None],
        };

        let res = ConfigResource::from_tree(&tree, SchemaVersion::V24)?;
        assert_eq!(res.items, vec![vec![b'h', 0, b'i', 0], vec![0xAB]]);
        assert_eq!(res.data[0], Some(vec![0xFF; 4]));
        Ok(())
    }

    #[test]
    fn import_rejects_small_dictionary_values() {
        let tree = ConfigTree {
            items: vec![ConfigNode::Dict(DictionaryMapping::new(vec![DictEntry::new(
                "k".into(),
                -2,
            )]))],
            ..Default::default()
        };
        assert!(matches!(
            ConfigResource::from_tree(&tree, SchemaVersion::V23),
            Err(Error::DictionaryValueOutOfRange(-2))
        ));
    }
}

//! Response assembly.

use plugins::ResponseFile;
use prost_types::compiler::code_generator_response::{self, Feature as WireFeature};
use prost_types::compiler::CodeGeneratorResponse;

/// Optional protoc capabilities the generator declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    /// Proto3 `optional` fields are understood.
    Proto3Optional,
}

impl Feature {
    /// Bit of this feature in `CodeGeneratorResponse.supported_features`.
    pub fn bit(self) -> u64 {
        match self {
            Feature::Proto3Optional => WireFeature::Proto3Optional as u64,
        }
    }
}

/// Set of declared features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet(Vec<Feature>);

impl FeatureSet {
    /// Features this generator supports.
    pub fn supported() -> Self { Self(vec![Feature::Proto3Optional]) }

    /// Whether `feature` is declared.
    pub fn contains(&self, feature: Feature) -> bool { self.0.contains(&feature) }

    /// Whether no feature is declared.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Declared features.
    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ { self.0.iter().copied() }

    /// Wire bitmask.
    pub fn bits(&self) -> u64 { self.0.iter().fold(0, |acc, f| acc | f.bit()) }
}

impl Default for FeatureSet {
    fn default() -> Self { Self::supported() }
}

/// A successful generation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Artifacts in engine order
    pub files: Vec<ResponseFile>,
    /// Declared features
    pub features: FeatureSet,
}

impl ResponseEnvelope {
    /// Convert into the protoc wire message.
    pub fn into_code_generator_response(self) -> CodeGeneratorResponse {
        CodeGeneratorResponse {
            supported_features: Some(self.features.bits()),
            file: self
                .files
                .into_iter()
                .map(|f| code_generator_response::File {
                    name: Some(f.name),
                    content: Some(f.content),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Wrap engine artifacts, in order, with the supported feature set.
pub fn emit_files(files: Vec<ResponseFile>) -> ResponseEnvelope {
    ResponseEnvelope { files, features: FeatureSet::supported() }
}

use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Shaders shipped with the engine, compiled on every build.
pub const ENGINE_SHADERS: &[&str] = &["DefaultShader.frag", "DefaultShader.vert"];

/// Name of the directory created under the output prefix.
pub const OUTPUT_DIRECTORY_NAME: &str = "EngineAssets";

pub const SHADERS_DIRECTORY_NAME: &str = "Shaders";
pub const SPIRV_EXTENSION: &str = "spv";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum AssetCategory {
    Models,
    Textures,
    Scenes,
}

impl AssetCategory {
    /// Categories in the order they are copied.
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Models,
        AssetCategory::Textures,
        AssetCategory::Scenes,
    ];

    pub fn directory_name(&self) -> &'static str {
        match self {
            AssetCategory::Models => "Models",
            AssetCategory::Textures => "Textures",
            AssetCategory::Scenes => "Scenes",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directory_name())
    }
}

/// The build configuration label passed by the orchestrator.
/// It is only reported, never used to change what gets built.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
    Other(String),
}

impl BuildType {
    pub fn parse(label: &str) -> Self {
        match label {
            "Debug" => BuildType::Debug,
            "Release" => BuildType::Release,
            "RelWithDebInfo" => BuildType::RelWithDebInfo,
            "MinSizeRel" => BuildType::MinSizeRel,
            other => BuildType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Debug => f.write_str("Debug"),
            BuildType::Release => f.write_str("Release"),
            BuildType::RelWithDebInfo => f.write_str("RelWithDebInfo"),
            BuildType::MinSizeRel => f.write_str("MinSizeRel"),
            BuildType::Other(label) => f.write_str(label),
        }
    }
}

/// Directory holding the engine's source assets. Never written to.
#[derive(Clone, Debug)]
pub struct AssetRoot {
    path: PathBuf,
}

impl AssetRoot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shaders_dir(&self) -> PathBuf {
        self.path.join(SHADERS_DIRECTORY_NAME)
    }

    pub fn category_dir(&self, category: AssetCategory) -> PathBuf {
        self.path.join(category.directory_name())
    }
}

/// `<prefix>/EngineAssets`, the directory this tool owns during a build.
#[derive(Clone, Debug)]
pub struct OutputRoot {
    path: PathBuf,
}

impl OutputRoot {
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Self {
        Self {
            path: prefix.as_ref().join(OUTPUT_DIRECTORY_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shaders_dir(&self) -> PathBuf {
        self.path.join(SHADERS_DIRECTORY_NAME)
    }

    pub fn category_dir(&self, category: AssetCategory) -> PathBuf {
        self.path.join(category.directory_name())
    }
}

/// `DefaultShader.frag` -> `DefaultShader.frag.spv`
pub fn spirv_file_name(shader_name: &str) -> String {
    format!("{}.{}", shader_name, SPIRV_EXTENSION)
}

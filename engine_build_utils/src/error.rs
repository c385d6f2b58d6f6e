use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

use crate::layout::AssetCategory;

/// Failure to compile a single shader.
#[derive(Error, Debug)]
pub enum ShaderCompileError {
    #[error("Could not launch shader compiler {program:?} for {source_path:?}: {error}")]
    Spawn {
        program: PathBuf,
        source_path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("Shader compiler exited with {status} while compiling {source_path:?}: {stderr}")]
    ExitStatus {
        source_path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("I/O error while compiling {path:?}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[cfg(feature = "shaderc")]
    #[error("shaderc failed on {source_path:?}: {message}")]
    Shaderc {
        source_path: PathBuf,
        message: String,
    },
}

impl ShaderCompileError {
    pub fn source_path(&self) -> &std::path::Path {
        match self {
            ShaderCompileError::Spawn { source_path, .. } => source_path,
            ShaderCompileError::ExitStatus { source_path, .. } => source_path,
            ShaderCompileError::Io { path, .. } => path,
            #[cfg(feature = "shaderc")]
            ShaderCompileError::Shaderc { source_path, .. } => source_path,
        }
    }
}

#[derive(Error, Debug)]
pub enum ShaderBuildError {
    #[error("Could not create shader output directory {path:?}: {error}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error(transparent)]
    Compile(#[from] ShaderCompileError),
}

#[derive(Error, Debug)]
pub enum AssetCopyError {
    #[error("Source directory for {category} does not exist: {path:?}")]
    MissingSource {
        category: AssetCategory,
        path: PathBuf,
    },

    #[error("Could not read directory {path:?}: {error}")]
    Read {
        path: PathBuf,
        #[source]
        error: fs_extra::error::Error,
    },

    #[error("Could not create directory {path:?}: {error}")]
    CreateDir {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("Could not copy {from:?} into {to:?}: {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: fs_extra::error::Error,
    },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Could not create output directory {path:?}: {error}")]
    CreateOutputRoot {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error(transparent)]
    Shaders(#[from] ShaderBuildError),

    #[error("{} shader(s) failed to compile:{}", .0.len(), format_failures(.0))]
    ShaderFailures(Vec<ShaderCompileError>),

    #[error(transparent)]
    Assets(#[from] AssetCopyError),

    #[error(
        "{assets}\nbefore that, {} shader(s) failed to compile:{}",
        .shader_failures.len(),
        format_failures(.shader_failures)
    )]
    AssetsAfterShaderFailures {
        #[source]
        assets: AssetCopyError,
        shader_failures: Vec<ShaderCompileError>,
    },
}

fn format_failures(failures: &[ShaderCompileError]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  {}", failure))
        .collect()
}

pub type BuildResult<T> = Result<T, BuildError>;

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, error, info, warn};

use crate::{
    error::{ShaderBuildError, ShaderCompileError},
    layout::spirv_file_name,
};

pub const DEFAULT_SHADER_COMPILER: &str = "glslc";

/// Turns one shader source file into a SPIR-V binary on disk.
pub trait ShaderBackend {
    fn compile(&self, source: &Path, destination: &Path) -> Result<(), ShaderCompileError>;
}

/// Runs an external compiler as `<program> [leading args] <source> -o <destination> [trailing args]`.
#[derive(Clone, Debug)]
pub struct ExternalCompiler {
    program: PathBuf,
    leading_args: Vec<OsString>,
    trailing_args: Vec<OsString>,
}

impl ExternalCompiler {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            leading_args: vec![],
            trailing_args: vec![],
        }
    }

    /// Passed before the source path, e.g. `-V` for glslangValidator.
    pub fn leading_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Appended after the output path, e.g. `--target-env=vulkan1.2`.
    pub fn trailing_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.trailing_args.push(arg.into());
        self
    }
}

impl Default for ExternalCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_SHADER_COMPILER)
    }
}

impl ShaderBackend for ExternalCompiler {
    fn compile(&self, source: &Path, destination: &Path) -> Result<(), ShaderCompileError> {
        debug!(
            "Running {:?} {:?} -o {:?}",
            self.program, source, destination
        );
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(source)
            .arg("-o")
            .arg(destination)
            .args(&self.trailing_args)
            .output()
            .map_err(|error| ShaderCompileError::Spawn {
                program: self.program.clone(),
                source_path: source.to_path_buf(),
                error,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        if !output.status.success() {
            return Err(ShaderCompileError::ExitStatus {
                source_path: source.to_path_buf(),
                status: output.status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!("{:?}: {}", source, stderr);
        }
        Ok(())
    }
}

#[cfg(feature = "shaderc")]
pub use in_process::ShadercBackend;

#[cfg(feature = "shaderc")]
mod in_process {
    use std::{fs, path::Path};

    use shaderc::ResolvedInclude;

    use super::ShaderBackend;
    use crate::error::ShaderCompileError;

    /// Compiles through libshaderc inside this process.
    pub struct ShadercBackend {
        compiler: shaderc::Compiler,
    }

    impl ShadercBackend {
        pub fn new() -> Option<Self> {
            let compiler = shaderc::Compiler::new()?;
            Some(Self { compiler })
        }
    }

    impl ShaderBackend for ShadercBackend {
        fn compile(&self, source: &Path, destination: &Path) -> Result<(), ShaderCompileError> {
            let shaderc_error = |message: String| ShaderCompileError::Shaderc {
                source_path: source.to_path_buf(),
                message,
            };
            let io_error = |error| ShaderCompileError::Io {
                path: source.to_path_buf(),
                error,
            };

            let content = fs::read_to_string(source).map_err(io_error)?;
            let extension = source
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            let shader_kind = match extension.as_str() {
                "vert" => shaderc::ShaderKind::Vertex,
                "frag" => shaderc::ShaderKind::Fragment,
                "comp" => shaderc::ShaderKind::Compute,
                _ => return Err(shaderc_error(format!("Unrecognized extension {extension:?}"))),
            };

            let include_root = source.parent().unwrap_or(Path::new(".")).to_path_buf();
            let mut compiler_options = shaderc::CompileOptions::new()
                .ok_or_else(|| shaderc_error("Could not create compile options".to_owned()))?;
            compiler_options.set_warnings_as_errors();
            compiler_options.set_include_callback(move |path, _, requested_by, _| {
                let path = include_root.join(path);
                let content = fs::read_to_string(&path)
                    .map_err(|e| format!("In file {requested_by}: could not include {path:?}: {e}"))?;

                Ok(ResolvedInclude {
                    resolved_name: path.to_string_lossy().into_owned(),
                    content,
                })
            });

            let name = source.to_string_lossy();
            let spirv = self
                .compiler
                .compile_into_spirv(&content, shader_kind, &name, "main", Some(&compiler_options))
                .map_err(|e| shaderc_error(e.to_string()))?;

            fs::write(destination, bytemuck::cast_slice::<u32, u8>(spirv.as_binary())).map_err(
                |error| ShaderCompileError::Io {
                    path: destination.to_path_buf(),
                    error,
                },
            )
        }
    }
}

/// What to do when a shader fails to compile.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ShaderErrorPolicy {
    /// Compile everything, then report every failure.
    #[default]
    CollectAll,
    /// Stop at the first failure.
    FailFast,
    /// Log failures and carry on as if the build succeeded.
    Ignore,
}

#[derive(Clone, Debug)]
struct ShaderJob {
    source: PathBuf,
    destination: PathBuf,
}

#[derive(Debug, Default)]
pub struct ShaderReport {
    pub compiled: Vec<PathBuf>,
    pub failures: Vec<ShaderCompileError>,
}

impl ShaderReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ShaderCompiler<B: ShaderBackend> {
    backend: B,

    jobs: Vec<ShaderJob>,
}

impl<B: ShaderBackend> ShaderCompiler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            jobs: vec![],
        }
    }

    pub fn add_shader(mut self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Self {
        self.jobs.push(ShaderJob {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
        });
        self
    }

    /// Queues `source_directory/<name>` -> `output_directory/<name>.spv` for every name.
    pub fn add_shaders_from(
        mut self,
        source_directory: impl AsRef<Path>,
        output_directory: impl AsRef<Path>,
        names: &[&str],
    ) -> Self {
        for name in names {
            self = self.add_shader(
                source_directory.as_ref().join(name),
                output_directory.as_ref().join(spirv_file_name(name)),
            );
        }
        self
    }

    pub fn compile(&self, policy: ShaderErrorPolicy) -> Result<ShaderReport, ShaderBuildError> {
        for job in &self.jobs {
            let Some(output_directory) = job.destination.parent() else {
                continue;
            };
            fs::create_dir_all(output_directory).map_err(|error| {
                ShaderBuildError::CreateOutputDir {
                    path: output_directory.to_path_buf(),
                    error,
                }
            })?;
        }

        let mut report = ShaderReport::default();
        for job in &self.jobs {
            info!("Compiling shader {:?}", job.source);
            match self.backend.compile(&job.source, &job.destination) {
                Ok(()) => report.compiled.push(job.destination.clone()),
                Err(e) => match policy {
                    ShaderErrorPolicy::FailFast => {
                        error!("{}", e);
                        return Err(e.into());
                    }
                    ShaderErrorPolicy::CollectAll => {
                        error!("{}", e);
                        report.failures.push(e);
                    }
                    ShaderErrorPolicy::Ignore => {
                        warn!("Ignoring shader failure: {}", e);
                        report.failures.push(e);
                    }
                },
            }
        }
        Ok(report)
    }
}

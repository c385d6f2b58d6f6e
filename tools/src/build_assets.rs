use std::{ffi::OsString, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use engine_build_utils::{
    build_engine_assets, AssetRoot, BuildOptions, BuildType, ExternalCompiler, OutputRoot,
    ShaderBackend, ShaderErrorPolicy, DEFAULT_SHADER_COMPILER,
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OnShaderError {
    /// Compile every shader, copy the assets, then fail listing every broken shader
    Collect,
    /// Stop at the first broken shader without copying assets
    FailFast,
    /// Log broken shaders and exit successfully
    Ignore,
}

impl From<OnShaderError> for ShaderErrorPolicy {
    fn from(value: OnShaderError) -> Self {
        match value {
            OnShaderError::Collect => ShaderErrorPolicy::CollectAll,
            OnShaderError::FailFast => ShaderErrorPolicy::FailFast,
            OnShaderError::Ignore => ShaderErrorPolicy::Ignore,
        }
    }
}

/// Compiles the engine shaders and copies the engine assets into <OUTPUT_DIR>/EngineAssets
#[derive(Parser, Debug)]
#[command(version, about)]
struct BuildAssetsArgs {
    /// Directory containing Shaders, Models, Textures and Scenes
    #[arg()]
    assets_dir: PathBuf,

    /// Build configuration label (Debug, Release, ...), only reported
    #[arg()]
    build_type: String,

    /// Prefix under which EngineAssets is created
    #[arg()]
    output_dir: PathBuf,

    /// Extra arguments some build systems append; ignored
    #[arg(hide = true)]
    extra: Vec<OsString>,

    /// Shader compiler invoked as `<compiler> <source> -o <output>`
    #[arg(long, env = "GLSLC", default_value = DEFAULT_SHADER_COMPILER)]
    compiler: PathBuf,

    /// Argument passed to the compiler before the source path; repeatable
    #[arg(long = "compiler-arg", allow_hyphen_values = true)]
    compiler_args: Vec<OsString>,

    /// Argument appended after the output path, e.g. --target-env=vulkan1.2; repeatable
    #[arg(long = "compiler-trailing-arg", allow_hyphen_values = true)]
    compiler_trailing_args: Vec<OsString>,

    /// Compile shaders in-process through shaderc instead of running --compiler
    #[cfg(feature = "shaderc")]
    #[arg(long)]
    in_process: bool,

    #[arg(
        long,
        value_enum,
        env = "ENGINE_ASSETS_ON_SHADER_ERROR",
        default_value = "collect"
    )]
    on_shader_error: OnShaderError,

    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn build<B: ShaderBackend>(args: &BuildAssetsArgs, backend: B) -> anyhow::Result<()> {
    let summary = build_engine_assets(BuildOptions {
        asset_root: AssetRoot::new(&args.assets_dir),
        output_root: OutputRoot::from_prefix(&args.output_dir),
        build_type: BuildType::parse(&args.build_type),
        backend,
        shader_error_policy: args.on_shader_error.into(),
    })
    .context("Failed to build engine assets")?;
    log::debug!("{:?}", summary);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = BuildAssetsArgs::parse();
    init_logging(args.verbose);

    if !args.extra.is_empty() {
        log::warn!("Ignoring extra arguments {:?}", args.extra);
    }

    #[cfg(feature = "shaderc")]
    {
        if args.in_process {
            let backend = engine_build_utils::ShadercBackend::new()
                .context("Could not create shaderc compiler")?;
            return build(&args, backend);
        }
    }

    let backend = args
        .compiler_args
        .iter()
        .fold(ExternalCompiler::new(&args.compiler), |compiler, arg| {
            compiler.leading_arg(arg)
        });
    let backend = args
        .compiler_trailing_args
        .iter()
        .fold(backend, |compiler, arg| compiler.trailing_arg(arg));
    build(&args, backend)
}

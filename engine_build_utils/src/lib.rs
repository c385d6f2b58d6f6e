pub mod asset_copier;
pub mod error;
pub mod layout;
pub mod shader_compiler;

use std::fs;

use log::{info, warn};

pub use asset_copier::{AssetCopier, CopyReport};
pub use error::{AssetCopyError, BuildError, BuildResult, ShaderBuildError, ShaderCompileError};
pub use layout::{AssetCategory, AssetRoot, BuildType, OutputRoot, ENGINE_SHADERS};
#[cfg(feature = "shaderc")]
pub use shader_compiler::ShadercBackend;
pub use shader_compiler::{
    ExternalCompiler, ShaderBackend, ShaderCompiler, ShaderErrorPolicy, ShaderReport,
    DEFAULT_SHADER_COMPILER,
};

#[cfg(feature = "shaderc")]
pub use shaderc;

pub struct BuildOptions<B: ShaderBackend> {
    pub asset_root: AssetRoot,
    pub output_root: OutputRoot,
    pub build_type: BuildType,
    pub backend: B,
    pub shader_error_policy: ShaderErrorPolicy,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub shaders: ShaderReport,
    pub assets: Vec<CopyReport>,
}

/// Compiles the engine shaders, then merge-copies the asset categories.
///
/// Under [`ShaderErrorPolicy::CollectAll`] shader failures do not stop the
/// copy step, but they are returned as [`BuildError::ShaderFailures`] once
/// it finishes, or alongside the copy error as
/// [`BuildError::AssetsAfterShaderFailures`] if copying fails. Under
/// [`ShaderErrorPolicy::Ignore`] they only show up in the returned summary.
pub fn build_engine_assets<B: ShaderBackend>(
    options: BuildOptions<B>,
) -> BuildResult<BuildSummary> {
    let BuildOptions {
        asset_root,
        output_root,
        build_type,
        backend,
        shader_error_policy,
    } = options;

    info!(
        "Building engine assets ({}) from {:?} into {:?}",
        build_type,
        asset_root.path(),
        output_root.path()
    );
    fs::create_dir_all(output_root.path()).map_err(|error| BuildError::CreateOutputRoot {
        path: output_root.path().to_path_buf(),
        error,
    })?;

    let shaders = ShaderCompiler::new(backend)
        .add_shaders_from(
            asset_root.shaders_dir(),
            output_root.shaders_dir(),
            ENGINE_SHADERS,
        )
        .compile(shader_error_policy)?;

    let assets = match AssetCopier::new(asset_root, output_root).copy_all() {
        Ok(assets) => assets,
        Err(e)
            if shader_error_policy == ShaderErrorPolicy::CollectAll && !shaders.is_success() =>
        {
            return Err(BuildError::AssetsAfterShaderFailures {
                assets: e,
                shader_failures: shaders.failures,
            });
        }
        Err(e) => return Err(e.into()),
    };
    let files_copied: usize = assets.iter().map(|report| report.files_copied).sum();
    info!(
        "Compiled {} shader(s), copied {} asset file(s)",
        shaders.compiled.len(),
        files_copied
    );

    match shader_error_policy {
        ShaderErrorPolicy::CollectAll if !shaders.is_success() => {
            Err(BuildError::ShaderFailures(shaders.failures))
        }
        ShaderErrorPolicy::Ignore if !shaders.is_success() => {
            warn!(
                "{} shader(s) failed to compile, continuing anyway",
                shaders.failures.len()
            );
            Ok(BuildSummary { shaders, assets })
        }
        _ => Ok(BuildSummary { shaders, assets }),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use crate::{
        build_engine_assets, error::BuildError, shader_compiler::tests::CopyingBackend,
        AssetCategory, AssetCopyError, AssetRoot, BuildOptions, BuildType, OutputRoot,
        ShaderBuildError, ShaderErrorPolicy,
    };

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn engine_assets(with_models: bool) -> tempfile::TempDir {
        let assets = tempfile::tempdir().unwrap();
        write(&assets.path().join("Shaders/DefaultShader.frag"), "frag");
        write(&assets.path().join("Shaders/DefaultShader.vert"), "vert");
        if with_models {
            write(&assets.path().join("Models/cube.obj"), "cube");
        }
        write(&assets.path().join("Textures/white.png"), "white");
        fs::create_dir_all(assets.path().join("Scenes")).unwrap();
        assets
    }

    fn options(
        assets: &Path,
        prefix: &Path,
        policy: ShaderErrorPolicy,
    ) -> BuildOptions<CopyingBackend> {
        BuildOptions {
            asset_root: AssetRoot::new(assets),
            output_root: OutputRoot::from_prefix(prefix),
            build_type: BuildType::Debug,
            backend: CopyingBackend::default(),
            shader_error_policy: policy,
        }
    }

    #[test]
    fn builds_full_layout() {
        let assets = engine_assets(true);
        let prefix = tempfile::tempdir().unwrap();

        let summary = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::CollectAll,
        ))
        .unwrap();

        let output = prefix.path().join("EngineAssets");
        let mut spirv: Vec<_> = fs::read_dir(output.join("Shaders"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        spirv.sort();
        assert_eq!(
            spirv,
            ["DefaultShader.frag.spv", "DefaultShader.vert.spv"]
        );
        assert_eq!(
            fs::read_to_string(output.join("Models/cube.obj")).unwrap(),
            "cube"
        );
        assert!(output.join("Scenes").is_dir());
        assert_eq!(summary.assets.len(), 3);
        assert_eq!(summary.shaders.compiled.len(), 2);
    }

    #[test]
    fn shader_failures_are_reported_after_copying() {
        let assets = engine_assets(true);
        fs::remove_file(assets.path().join("Shaders/DefaultShader.vert")).unwrap();
        let prefix = tempfile::tempdir().unwrap();

        let result = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::CollectAll,
        ));

        match result {
            Err(BuildError::ShaderFailures(failures)) => assert_eq!(failures.len(), 1),
            other => panic!("Unexpected result {other:?}"),
        }
        assert!(prefix
            .path()
            .join("EngineAssets/Textures/white.png")
            .is_file());
    }

    #[test]
    fn ignored_shader_failures_still_succeed() {
        let assets = engine_assets(true);
        fs::remove_file(assets.path().join("Shaders/DefaultShader.frag")).unwrap();
        let prefix = tempfile::tempdir().unwrap();

        let summary = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::Ignore,
        ))
        .unwrap();

        assert_eq!(summary.shaders.failures.len(), 1);
        assert!(prefix.path().join("EngineAssets/Scenes").is_dir());
    }

    #[test]
    fn fail_fast_skips_asset_copy() {
        let assets = engine_assets(true);
        fs::remove_file(assets.path().join("Shaders/DefaultShader.frag")).unwrap();
        let prefix = tempfile::tempdir().unwrap();

        let result = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::FailFast,
        ));

        assert!(matches!(
            result,
            Err(BuildError::Shaders(ShaderBuildError::Compile(_)))
        ));
        assert!(!prefix.path().join("EngineAssets/Models").exists());
    }

    #[test]
    fn missing_models_aborts_before_textures() {
        let assets = engine_assets(false);
        let prefix = tempfile::tempdir().unwrap();

        let result = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::CollectAll,
        ));

        assert!(matches!(result, Err(BuildError::Assets(_))));
        let output = prefix.path().join("EngineAssets");
        assert!(!output.join("Textures").exists());
        assert!(!output.join("Scenes").exists());
    }

    #[test]
    fn missing_models_keeps_collected_shader_failures() {
        let assets = engine_assets(false);
        fs::remove_file(assets.path().join("Shaders/DefaultShader.frag")).unwrap();
        fs::remove_file(assets.path().join("Shaders/DefaultShader.vert")).unwrap();
        let prefix = tempfile::tempdir().unwrap();

        let result = build_engine_assets(options(
            assets.path(),
            prefix.path(),
            ShaderErrorPolicy::CollectAll,
        ));

        let error = result.unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Models"), "{message}");
        assert!(message.contains("DefaultShader.frag"), "{message}");
        assert!(message.contains("DefaultShader.vert"), "{message}");
        match error {
            BuildError::AssetsAfterShaderFailures {
                assets,
                shader_failures,
            } => {
                assert!(matches!(
                    assets,
                    AssetCopyError::MissingSource {
                        category: AssetCategory::Models,
                        ..
                    }
                ));
                assert_eq!(shader_failures.len(), 2);
            }
            other => panic!("Unexpected error {other:?}"),
        }
        let output = prefix.path().join("EngineAssets");
        assert!(!output.join("Textures").exists());
        assert!(!output.join("Scenes").exists());
    }
}

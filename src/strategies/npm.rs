//! npm strategy (Node.js runtimes)

use super::{Step, StepError, StrategyContext, TaskFlow};
use crate::exec::CommandSpec;
use crate::stack::{Stage, StrategyKind};
use serde_json::Value;
use std::path::Path;

pub struct NpmTaskFlow;

impl TaskFlow for NpmTaskFlow {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Npm
    }

    fn steps(&self, stage: &Stage, ctx: &StrategyContext) -> Result<Vec<Step>, StepError> {
        match stage {
            Stage::Install => {
                let mut install =
                    CommandSpec::new("npm", &ctx.artifact_dir).args(["install", "--production"]);
                if let Some(registry) = ctx.option_str("registry") {
                    install = install.args(["--registry", registry]);
                }
                Ok(vec![Step::CopySource, Step::Run(install)])
            }
            Stage::Build => {
                if has_build_script(&ctx.source_dir)? {
                    Ok(vec![Step::Run(
                        CommandSpec::new("npm", &ctx.artifact_dir).args(["run", "build"]),
                    )])
                } else {
                    Ok(vec![])
                }
            }
            Stage::Custom(_) => Ok(vec![]),
        }
    }
}

/// Whether `package.json` declares `scripts.build`. A missing file means no.
fn has_build_script(source_dir: &Path) -> Result<bool, StepError> {
    let path = source_dir.join("package.json");
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(StepError::Manifest {
                path,
                message: e.to_string(),
            })
        }
    };

    let manifest: Value = serde_json::from_str(&content).map_err(|e| StepError::Manifest {
        path: path.clone(),
        message: e.to_string(),
    })?;

    Ok(manifest
        .get("scripts")
        .and_then(|scripts| scripts.get("build"))
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::context;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_install_copies_then_installs() {
        let source = TempDir::new().unwrap();
        let ctx = context(source.path(), Path::new("/out"), vec![]);

        let steps = NpmTaskFlow.steps(&Stage::Install, &ctx).unwrap();

        assert_eq!(steps[0], Step::CopySource);
        match &steps[1] {
            Step::Run(spec) => {
                assert_eq!(spec.display(), "npm install --production");
                assert_eq!(spec.cwd, Path::new("/out"));
            }
            other => panic!("Expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_install_uses_registry_option() {
        let source = TempDir::new().unwrap();
        let mut ctx = context(source.path(), Path::new("/out"), vec![]);
        ctx.options
            .insert("registry".to_string(), json!("https://registry.npmmirror.com"));

        let steps = NpmTaskFlow.steps(&Stage::Install, &ctx).unwrap();
        assert!(matches!(
            &steps[1],
            Step::Run(spec) if spec.display().ends_with("--registry https://registry.npmmirror.com")
        ));
    }

    #[test]
    fn test_build_only_with_build_script() {
        let source = TempDir::new().unwrap();
        let ctx = context(source.path(), Path::new("/out"), vec![]);

        fs::write(source.path().join("package.json"), r#"{"name":"x"}"#).unwrap();
        assert!(NpmTaskFlow.steps(&Stage::Build, &ctx).unwrap().is_empty());

        fs::write(
            source.path().join("package.json"),
            r#"{"name":"x","scripts":{"build":"tsc"}}"#,
        )
        .unwrap();
        assert_eq!(NpmTaskFlow.steps(&Stage::Build, &ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_build_rejects_broken_manifest() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("package.json"), "{ nope").unwrap();
        let ctx = context(source.path(), Path::new("/out"), vec![]);

        let err = NpmTaskFlow.steps(&Stage::Build, &ctx).unwrap_err();
        assert!(matches!(err, StepError::Manifest { .. }));
    }
}

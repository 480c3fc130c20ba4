//! Command table used by the CLI.
//!
//! `dx.*` commands route back into the engine. The `env`, `px` and `dns`
//! families are answered by hook executables named in the configuration,
//! invoked as `<hook> <command> <json-args>` with stdout parsed as JSON.

use std::path::Path;
use std::sync::{Arc, Weak};

use berth_common::config::BerthConfig;
use berth_common::error::{BerthError, Result};
use berth_runtime::dispatch::{CommandTable, Dispatcher, commands};
use berth_runtime::engine::Engine;
use berth_runtime::exec::CommandRunner;
use serde_json::Value;

/// Hook families and the commands each one answers.
const HOOK_FAMILIES: &[(&str, &[&str])] = &[
    ("env", &[commands::ENV_SHOW]),
    ("px", &[commands::PX_ADD, commands::PX_UPDATE, commands::PX_REMOVE]),
    (
        "dns",
        &[commands::DNS_ADD, commands::DNS_REMOVE, commands::DNS_RELOAD],
    ),
];

/// Builds the table. Commands of a family without a hook stay unregistered,
/// except `env.show`, which then answers with no variables.
pub fn build(
    engine: &Engine,
    config: &BerthConfig,
    runner: Arc<dyn CommandRunner>,
) -> Arc<CommandTable> {
    Arc::new_cyclic(|weak: &Weak<CommandTable>| {
        let mut table = CommandTable::new();
        let bus: Weak<dyn Dispatcher> = weak.clone();
        engine.register_commands(&mut table, bus);

        for &(family, family_commands) in HOOK_FAMILIES {
            match config.hook(family) {
                Some(hook) => {
                    for &command in family_commands {
                        register_hook(&mut table, command, hook, &runner);
                    }
                }
                None if family == "env" => {
                    table.register(commands::ENV_SHOW, |_| async { Ok(Value::Array(Vec::new())) });
                }
                None => tracing::debug!(family, "no hook configured"),
            }
        }
        table
    })
}

fn register_hook(
    table: &mut CommandTable,
    command: &'static str,
    hook: &Path,
    runner: &Arc<dyn CommandRunner>,
) {
    let hook = hook.to_path_buf();
    let runner = Arc::clone(runner);
    table.register(command, move |args: Value| {
        let hook = hook.clone();
        let runner = Arc::clone(&runner);
        async move { call_hook(runner.as_ref(), &hook, command, &args).await }
    });
}

async fn call_hook(
    runner: &dyn CommandRunner,
    hook: &Path,
    command: &str,
    args: &Value,
) -> Result<Value> {
    let program = hook.to_string_lossy();
    let argv = vec![command.to_string(), args.to_string()];
    let out = runner.run(&program, &argv, None).await?;
    if !out.success() {
        return Err(BerthError::dispatch(
            command,
            format!(
                "hook {} exited with status {}: {}",
                hook.display(),
                out.exit_code,
                out.diagnostics().trim()
            ),
        ));
    }

    let stdout = out.stdout.trim();
    if stdout.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(stdout).map_err(|e| {
        BerthError::dispatch(command, format!("hook {} returned invalid JSON: {e}", hook.display()))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use berth_common::types::NewContainer;
    use berth_registry::Registry;
    use berth_runtime::adapter::RuntimeAdapter;
    use berth_runtime::exec::{EnvMap, ExecOutput};
    use serde_json::json;

    use super::*;

    /// Records invocations and answers hooks with canned stdout.
    #[derive(Default)]
    struct ScriptedRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        stdout: String,
        exit_code: i32,
    }

    impl ScriptedRunner {
        fn answering(stdout: &str, exit_code: i32) -> Arc<Self> {
            Arc::new(Self {
                stdout: stdout.into(),
                exit_code,
                ..Self::default()
            })
        }

        fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _env: Option<&EnvMap>,
        ) -> Result<ExecOutput> {
            self.calls.lock().unwrap().push((program.to_string(), args.to_vec()));
            let hook = program != "docker";
            Ok(ExecOutput {
                stdout: if hook { self.stdout.clone() } else { String::new() },
                stderr: if self.exit_code == 0 { String::new() } else { "denied".into() },
                exit_code: if hook { self.exit_code } else { 0 },
            })
        }
    }

    fn setup(
        config: &BerthConfig,
        runner: Arc<ScriptedRunner>,
    ) -> (tempfile::TempDir, Arc<CommandTable>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = Registry::open(dir.path().join("registry.json")).expect("open");
        let _ = registry
            .add(NewContainer::new("web", "web:latest"))
            .expect("add");
        let adapter = RuntimeAdapter::new(runner.clone());
        let engine = Engine::new(Arc::new(registry), adapter);
        let table = build(&engine, config, runner);
        (dir, table)
    }

    fn with_hooks(hooks: &[(&str, &str)]) -> BerthConfig {
        let mut config = BerthConfig::default();
        for (family, path) in hooks {
            let _ = config.hooks.insert((*family).to_string(), PathBuf::from(path));
        }
        config
    }

    // ── Hooks ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn hook_receives_command_and_json_args() {
        let runner = ScriptedRunner::answering(r#"{"ok":true}"#, 0);
        let (_dir, table) = setup(&with_hooks(&[("px", "/opt/px-hook")]), runner.clone());

        let out = table
            .run(commands::PX_UPDATE, json!({ "domain": "a.com" }))
            .await
            .expect("px.update");

        assert_eq!(out, json!({ "ok": true }));
        assert_eq!(
            runner.calls(),
            vec![(
                "/opt/px-hook".to_string(),
                vec!["px.update".to_string(), r#"{"domain":"a.com"}"#.to_string()]
            )]
        );
    }

    #[tokio::test]
    async fn empty_hook_output_is_null() {
        let runner = ScriptedRunner::answering("  \n", 0);
        let (_dir, table) = setup(&with_hooks(&[("dns", "/opt/dns-hook")]), runner);

        let out = table.run(commands::DNS_RELOAD, json!({})).await.expect("dns.reload");
        assert_eq!(out, Value::Null);
    }

    #[tokio::test]
    async fn failing_hook_is_dispatch_error() {
        let runner = ScriptedRunner::answering("", 2);
        let (_dir, table) = setup(&with_hooks(&[("dns", "/opt/dns-hook")]), runner);

        let err = table
            .run(commands::DNS_ADD, json!({ "domain": "a.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::Dispatch { ref command, .. } if command == "dns.add"));
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn invalid_hook_output_is_dispatch_error() {
        let runner = ScriptedRunner::answering("not json", 0);
        let (_dir, table) = setup(&with_hooks(&[("env", "/opt/env-hook")]), runner);

        let err = table
            .run(commands::ENV_SHOW, json!({ "name": "web" }))
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::Dispatch { .. }));
    }

    // ── Defaults ───────────────────────────────────────────────────

    #[tokio::test]
    async fn env_show_without_hook_answers_empty_list() {
        let runner = ScriptedRunner::answering("", 0);
        let (_dir, table) = setup(&BerthConfig::default(), runner.clone());

        let out = table
            .run(commands::ENV_SHOW, json!({ "name": "web" }))
            .await
            .expect("env.show");
        assert_eq!(out, json!([]));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn unhooked_family_is_dispatch_error() {
        let runner = ScriptedRunner::answering("", 0);
        let (_dir, table) = setup(&BerthConfig::default(), runner);

        assert!(!table.contains(commands::PX_UPDATE));
        let err = table
            .run(commands::PX_UPDATE, json!({ "domain": "a.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::Dispatch { .. }));
    }

    // ── Engine routing ─────────────────────────────────────────────

    #[tokio::test]
    async fn dx_commands_reach_the_runtime() {
        let runner = ScriptedRunner::answering("", 0);
        let (_dir, table) = setup(&BerthConfig::default(), runner.clone());

        let _ = table
            .run(commands::DX_PULL, json!({ "image": "web:latest" }))
            .await
            .expect("dx.pull");
        let _ = table.run(commands::DX_PRUNE, json!({})).await.expect("dx.prune");

        let calls = runner.calls();
        assert_eq!(calls[0].0, "docker");
        assert_eq!(calls[0].1, vec!["pull", "web:latest"]);
        assert_eq!(calls[1].1, vec!["image", "prune", "-f"]);
    }

    #[tokio::test]
    async fn dx_start_dispatches_through_the_same_table() {
        let runner = ScriptedRunner::answering("", 0);
        let (_dir, table) = setup(&BerthConfig::default(), runner.clone());

        let _ = table
            .run(commands::DX_START, json!({ "name": "web" }))
            .await
            .expect("dx.start");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1[0], "run");
        assert_eq!(calls[0].1.last().map(String::as_str), Some("web:latest"));
    }
}

// ABOUTME: Integration tests for the bridged engine adapter.
// ABOUTME: Drives the adapter with a scripted command runner instead of real processes.

mod support;

use berth::bridge::{Bridge, BridgeConfig};
use berth::runtime::traits::*;
use berth::runtime::{BridgedEngine, ConnectErrorKind, ErrorKind, SourceConfig, connect_bridged};
use berth::service::{ComposeQuery, ControlPlane, NoopSink};
use berth::types::{ContainerId, ImageId, Source};
use futures::StreamExt;
use std::sync::Arc;
use support::{ScriptedRunner, fail, ok, ok_with_warning};

const PS_ROWS: &str = concat!(
    r#"{"Command":"\"nginx -g\"","CreatedAt":"2024-01-15 10:30:00 +0000 UTC","ID":"abc123","Image":"nginx:latest","Labels":"com.docker.compose.project=web","Names":"web","Networks":"frontend","Ports":"0.0.0.0:8080->80/tcp","State":"running","Status":"Up 2 hours"}"#,
    "\n",
    r#"{"Command":"\"sleep\"","CreatedAt":"2024-01-15 11:00:00 +0000 UTC","ID":"def456","Image":"busybox","Labels":"tier=batch","Names":"job","Networks":"frontend","Ports":"","State":"exited","Status":"Exited (0) 1 hour ago"}"#,
    "\n",
);

const INSPECT_ABC: &str = r#"[{
    "Id": "abc123",
    "Image": "sha256:1111aaaa",
    "Config": {"Labels": {"com.docker.compose.project": "web", "extra": "yes"}},
    "NetworkSettings": {"Networks": {"frontend": {"NetworkID": "net999", "IPAddress": "172.18.0.2"}}},
    "Mounts": [{"Type": "volume", "Name": "webdata", "Source": "/var/lib/docker/volumes/webdata/_data", "Destination": "/data", "RW": true}],
    "HostConfig": {"NetworkMode": "frontend"}
}]"#;

fn engine(runner: ScriptedRunner) -> (Arc<ScriptedRunner>, BridgedEngine) {
    let runner = Arc::new(runner);
    let bridge = Bridge::with_runner(BridgeConfig::wsl("Ubuntu"), runner.clone());
    let config = SourceConfig::default().with_source(Source::bridged());
    (runner, BridgedEngine::new(bridge, &config))
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn commands_run_through_launcher() {
        support::init_tracing();
        let (runner, engine) = engine(ScriptedRunner::new().on("-- docker ps", ok(PS_ROWS)));

        let containers = engine.list_containers(&ContainerFilters::all()).await.unwrap();
        assert_eq!(containers.len(), 2);

        let calls = runner.calls();
        assert_eq!(calls[0].program, "wsl.exe");
        assert_eq!(
            calls[0].args[..6],
            ["-d", "Ubuntu", "--", "docker", "ps", "--no-trunc"]
        );
        assert!(calls[0].args.contains(&"-a".to_string()));
        assert_eq!(engine.source(), Source::bridged_profile("Ubuntu"));
    }

    #[tokio::test]
    async fn failed_inspect_degrades_one_record() {
        support::init_tracing();
        let (_, engine) = engine(
            ScriptedRunner::new()
                .on("-- docker ps", ok(PS_ROWS))
                .on("inspect --type container abc123", ok(INSPECT_ABC))
                .on("inspect --type container def456", support::Reply::Timeout),
        );
        let plane = ControlPlane::new(Arc::new(engine), Arc::new(NoopSink));

        let containers = plane.list_containers(true).await.unwrap();
        assert_eq!(containers.len(), 2);

        let web = &containers[0];
        assert_eq!(web.id.as_str(), "abc123");
        assert_eq!(web.image_id, "sha256:1111aaaa");
        assert_eq!(web.labels["extra"], "yes");
        assert_eq!(web.network_settings.networks["frontend"].network_id, "net999");
        assert_eq!(web.mounts[0].volume_name(), Some("webdata"));

        let job = &containers[1];
        assert_eq!(job.id.as_str(), "def456");
        assert_eq!(job.name(), "job");
        assert_eq!(job.status, "Exited (0) 1 hour ago");
        assert!(job.labels.is_empty());
        assert!(job.network_settings.is_empty());
    }

    #[tokio::test]
    async fn stderr_warnings_with_success_are_not_errors() {
        let (_, engine) = engine(ScriptedRunner::new().on(
            "volume ls",
            ok_with_warning(
                r#"{"Driver":"local","Labels":"","Mountpoint":"/var/lib/docker/volumes/webdata/_data","Name":"webdata","Scope":"local"}"#,
                "WARNING: No swap limit support",
            ),
        ));

        let volumes = engine.list_volumes().await.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "webdata");
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let rows = concat!(
            r#"{"ID":"n1","Name":"bridge","Driver":"bridge","Scope":"local"}"#,
            "\n",
            "not json at all\n",
            r#"{"ID":"n2","Name":"frontend","Driver":"bridge","Scope":"local"}"#,
        );
        let (_, engine) = engine(ScriptedRunner::new().on("network ls", ok(rows)));

        let networks = engine.list_networks().await.unwrap();
        let names: Vec<&str> = networks.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["bridge", "frontend"]);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn missing_engine_binary_fails_connect() {
        let runner = Arc::new(
            ScriptedRunner::new().on("docker --version", fail(127, "/bin/bash: docker: command not found")),
        );
        let bridge = Bridge::with_runner(BridgeConfig::wsl("Ubuntu"), runner);
        let config = SourceConfig::default().with_source(Source::bridged());

        let err = connect_bridged(bridge, &config).await.err().unwrap();
        assert_eq!(err.kind(), ConnectErrorKind::RemoteEngineMissing);
        assert_eq!(err.error_kind(), ErrorKind::RemoteEngineMissing);
    }

    #[tokio::test]
    async fn missing_launcher_fails_connect() {
        let runner = Arc::new(ScriptedRunner::new().on("--version", support::Reply::MissingProgram));
        let bridge = Bridge::with_runner(BridgeConfig::wsl("Ubuntu"), runner);
        let config = SourceConfig::default().with_source(Source::bridged());

        let err = connect_bridged(bridge, &config).await.err().unwrap();
        assert_eq!(err.kind(), ConnectErrorKind::LauncherMissing);
    }

    #[tokio::test]
    async fn missing_binary_during_operation() {
        let (_, engine) = engine(ScriptedRunner::new().on("-- docker", fail(127, "docker: not found")));
        let err = engine.list_images().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteEngineMissing);
    }

    #[tokio::test]
    async fn timeout_is_classified() {
        let (_, engine) = engine(ScriptedRunner::new().on("stop abc123", support::Reply::Timeout));
        let err = engine.stop_container(&ContainerId::from("abc123")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn unknown_container_is_not_found() {
        let (_, engine) = engine(
            ScriptedRunner::new().on("start zzz", fail(1, "Error response from daemon: No such container: zzz")),
        );
        let err = engine.start_container(&ContainerId::from("zzz")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.detail().contains("zzz"));
    }

    #[tokio::test]
    async fn daemon_down_is_unavailable() {
        let (_, engine) = engine(ScriptedRunner::new().on(
            "-- docker ps",
            fail(
                1,
                "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?",
            ),
        ));
        let err = engine.list_containers(&ContainerFilters::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
    }

    #[tokio::test]
    async fn rejected_request_keeps_engine_text() {
        let stderr = "Error response from daemon: conflict: unable to remove repository reference \"nginx\" (must force) - container abc123 is using its referenced image 1111aaaa";
        let (_, engine) = engine(ScriptedRunner::new().on("rmi", fail(1, stderr)));

        let err = engine
            .remove_image(&ImageId::from("sha256:1111aaaa"), false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(err.detail().contains("is using its referenced image"));
    }

    #[tokio::test]
    async fn failing_exec_inside_container_is_output() {
        let (_, engine) = engine(ScriptedRunner::new().on(
            "exec abc123",
            fail(2, "ls: cannot access '/nope': No such file or directory"),
        ));

        let result = engine
            .exec(&ContainerId::from("abc123"), &["ls".to_string(), "/nope".to_string()])
            .await
            .unwrap();
        assert_eq!(result.exit_code, Some(2));
        assert!(result.output.contains("cannot access"));
    }

    #[tokio::test]
    async fn command_missing_inside_container_is_output() {
        let (_, engine) = engine(ScriptedRunner::new().on("exec abc123", fail(127, "sh: nope: not found")));

        let result = engine
            .exec(
                &ContainerId::from("abc123"),
                &["sh".to_string(), "-c".to_string(), "nope".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(result.exit_code, Some(127));
        assert!(result.output.contains("nope: not found"));
    }

    #[tokio::test]
    async fn exec_without_engine_binary_is_remote_engine_missing() {
        let (_, engine) = engine(
            ScriptedRunner::new().on("exec abc123", fail(127, "bash: line 1: docker: command not found")),
        );

        let err = engine
            .exec(&ContainerId::from("abc123"), &["true".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteEngineMissing);
    }

    #[tokio::test]
    async fn exec_in_unknown_container_is_not_found() {
        let (_, engine) = engine(ScriptedRunner::new().on(
            "exec zzz",
            fail(1, "Error response from daemon: No such container: zzz"),
        ));

        let err = engine
            .exec(&ContainerId::from("zzz"), &["true".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod degraded {
    use super::*;
    use berth::model::Usage;

    const PS_WITH_MOUNTS: &str = r#"{"Command":"\"nginx -g\"","CreatedAt":"2024-01-15 10:30:00 +0000 UTC","ID":"abc123","Image":"nginx:latest","Labels":"","Mounts":"webdata,/home/me/site","Names":"web","Networks":"frontend","Ports":"","State":"running","Status":"Up 2 hours"}"#;

    #[tokio::test]
    async fn listed_volumes_stay_in_use_when_inspect_fails() {
        let (_, engine) = engine(
            ScriptedRunner::new()
                .on(
                    "volume ls",
                    ok(concat!(
                        r#"{"Driver":"local","Labels":"","Mountpoint":"/var/lib/docker/volumes/webdata/_data","Name":"webdata","Scope":"local"}"#,
                        "\n",
                        r#"{"Driver":"local","Labels":"","Mountpoint":"/var/lib/docker/volumes/stale/_data","Name":"stale","Scope":"local"}"#,
                    )),
                )
                .on("-- docker ps", ok(PS_WITH_MOUNTS))
                .on("inspect", support::Reply::Timeout),
        );
        let plane = ControlPlane::new(Arc::new(engine), Arc::new(NoopSink));

        let volumes = plane.list_volumes().await.unwrap();
        assert_eq!(volumes[0].resource.name, "webdata");
        assert_eq!(volumes[0].usage, Usage::Used);
        assert_eq!(volumes[0].used_by[0].name, "web");
        assert_eq!(volumes[1].usage, Usage::Orphaned);
    }

    #[tokio::test]
    async fn container_found_by_name() {
        let (runner, engine) = engine(
            ScriptedRunner::new()
                .on("--filter id=web", ok(""))
                .on("--filter name=web", ok(PS_WITH_MOUNTS))
                .on("inspect", ok(INSPECT_ABC)),
        );
        let plane = ControlPlane::new(Arc::new(engine), Arc::new(NoopSink));

        let found = plane.get_container(&ContainerId::from("web")).await.unwrap();
        assert_eq!(found.id.as_str(), "abc123");
        assert_eq!(found.labels["extra"], "yes");

        let lookups: Vec<String> = runner.calls().iter().map(|c| c.args.join(" ")).collect();
        assert!(lookups[0].contains("--filter id=web"));
        assert!(lookups[1].contains("--filter name=web"));
    }
}

mod logs {
    use super::*;

    #[tokio::test]
    async fn fetch_uses_tail_and_timestamps() {
        let (runner, engine) = engine(ScriptedRunner::new().on("logs", ok("one\ntwo\n")));

        let text = engine
            .fetch_logs(&ContainerId::from("abc123"), &LogOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "one\ntwo\n");

        let args = runner.calls()[0].args.join(" ");
        assert!(args.ends_with("logs --timestamps --tail 100 abc123"), "{args}");
    }

    #[tokio::test]
    async fn stream_yields_lines() {
        let (runner, engine) = engine(ScriptedRunner::new().on("logs", ok("one\ntwo\n")));

        let stream = engine
            .stream_logs(&ContainerId::from("abc123"), &LogOptions::follow(Some(10)))
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(chunks, ["one\n", "two\n"]);
        assert!(runner.calls()[0].args.contains(&"--follow".to_string()));
    }

    #[tokio::test]
    async fn stream_of_unknown_container_yields_error() {
        let (_, engine) = engine(
            ScriptedRunner::new().on("logs", ok("Error response from daemon: No such container: zzz\n")),
        );

        let stream = engine
            .stream_logs(&ContainerId::from("zzz"), &LogOptions::follow(None))
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 1);
        let err = chunks.into_iter().next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn error_text_after_the_first_line_is_log_output() {
        let (_, engine) = engine(ScriptedRunner::new().on(
            "logs",
            ok("booting\nError response from daemon: upstream said no\n"),
        ));

        let stream = engine
            .stream_logs(&ContainerId::from("abc123"), &LogOptions::follow(None))
            .await
            .unwrap();
        let chunks: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(chunks.len(), 2);
    }
}

mod host {
    use super::*;

    #[tokio::test]
    async fn compose_lookup_translates_host_paths() {
        let (runner, engine) = engine(
            ScriptedRunner::new()
                .on("cat /mnt/c/proj/compose.yml", ok("services: {}\n"))
                .on("cat", fail(1, "cat: No such file or directory")),
        );
        let plane = ControlPlane::new(Arc::new(engine), Arc::new(NoopSink));

        let cwd = tempfile::tempdir().unwrap();
        let query = ComposeQuery::new("web").working_dir(r"C:\proj");
        let file = plane.compose_file_in(&query, cwd.path()).await.unwrap();

        assert_eq!(file.file_name, "compose.yml");
        assert_eq!(file.file_path, r"C:\proj\compose.yml");
        assert_eq!(file.content, "services: {}\n");

        let reads: Vec<String> = runner.calls().iter().map(|c| c.args.join(" ")).collect();
        assert_eq!(reads.len(), 3);
        assert!(reads[0].ends_with("cat /mnt/c/proj/docker-compose.yml"));
    }

    #[tokio::test]
    async fn raw_command_runs_inside_profile() {
        let (runner, engine) = engine(ScriptedRunner::new().on("-- docker version", ok("24.0.7\n")));
        let plane = ControlPlane::new(Arc::new(engine), Arc::new(NoopSink));

        let result = plane.run_command("docker version; rm -rf /").await.unwrap();
        assert!(result.success);
        assert_eq!(result.command, "docker version");
        assert_eq!(result.output, "24.0.7\n");
        assert_eq!(result.source, "bridged:Ubuntu");
        assert_eq!(runner.calls()[0].args, ["-d", "Ubuntu", "--", "docker", "version"]);
    }
}

// ABOUTME: Bridged engine adapter that drives the engine CLI through a shell bridge.
// ABOUTME: Decodes line-oriented JSON rows and classifies failures from stderr.

pub mod mapping;

use super::error::{EngineError, EngineResult};
use super::local::{listing_command, listing_error};
use super::traits::{
    ContainerFilters, ContainerOps, ExecOps, ExecOutput, FileOps, ImageOps, LogOps, LogOptions,
    LogStream, NetworkOps, RuntimeInfo, StatsOps, Timeouts, VolumeOps,
};
use super::types::SourceConfig;
use crate::bridge::{Bridge, CommandOutput};
use crate::decode::{parse_listing, parse_records, strip_control, strip_multiplexed};
use crate::model::{Container, ContainerStats, FileEntry, Image, InspectDetails, Network, Volume};
use crate::types::{ContainerId, ImageId, NetworkId, Source};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::time::Duration;

const JSON_FORMAT: &str = "{{json .}}";

fn cli_args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Engine adapter for an engine CLI reached through a bridge launcher.
#[derive(Debug, Clone)]
pub struct BridgedEngine {
    bridge: Bridge,
    binary: String,
    timeouts: Timeouts,
    source: Source,
}

impl BridgedEngine {
    pub fn new(bridge: Bridge, config: &SourceConfig) -> Self {
        let source = Source::bridged_profile(bridge.config().profile.clone());
        Self {
            bridge,
            binary: config.engine_binary.clone(),
            timeouts: config.timeouts,
            source,
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Run the engine CLI and collect output, without judging the exit status.
    async fn invoke(&self, args: &[String], budget: Duration) -> EngineResult<CommandOutput> {
        self.bridge
            .exec(&self.binary, args, budget)
            .await
            .map_err(|e| match e {
                crate::bridge::Error::CommandTimeout(after) => {
                    EngineError::timeout(format!("{} {}", self.binary, args.join(" ")), after)
                }
                e => e.into(),
            })
    }

    /// Run the engine CLI; a non-zero exit becomes a classified error.
    async fn run(&self, args: &[String], budget: Duration) -> EngineResult<CommandOutput> {
        let output = self.invoke(args, budget).await?;
        if !output.success() {
            return Err(mapping::classify_failure(&self.binary, &output));
        }
        if !output.stderr.trim().is_empty() {
            tracing::warn!(
                command = %args.first().map(String::as_str).unwrap_or_default(),
                stderr = %output.stderr.trim(),
                "engine reported warnings"
            );
        }
        Ok(output)
    }

    /// Run a `--format '{{json .}}'` listing and decode each row.
    async fn list_rows<T: serde::de::DeserializeOwned>(&self, args: &[String]) -> EngineResult<Vec<T>> {
        let output = self.run(args, self.timeouts.info).await?;
        Ok(parse_records(&output.stdout_text()))
    }

    async fn exec_raw(&self, id: &ContainerId, command: &[String]) -> EngineResult<ExecOutput> {
        let mut argv = cli_args(["exec".to_string(), id.to_string()]);
        argv.extend(command.iter().cloned());

        let output = self.invoke(&argv, self.timeouts.exec).await?;
        if !output.success()
            && let Some(error) = mapping::recognize_exec_failure(&self.binary, &output)
        {
            return Err(error);
        }

        let mut text = strip_multiplexed(&output.stdout);
        let stderr = strip_control(&output.stderr);
        if !stderr.trim().is_empty() {
            text.push_str(&stderr);
        }
        Ok(ExecOutput {
            output: text,
            exit_code: Some(i64::from(output.exit_code)),
        })
    }

    fn log_args(id: &ContainerId, opts: &LogOptions) -> Vec<String> {
        let mut argv = cli_args(["logs"]);
        if opts.timestamps {
            argv.push("--timestamps".to_string());
        }
        if opts.follow {
            argv.push("--follow".to_string());
        }
        argv.push("--tail".to_string());
        argv.push(opts.tail_arg());
        argv.push(id.to_string());
        argv
    }
}

#[async_trait]
impl ContainerOps for BridgedEngine {
    async fn list_containers(&self, filters: &ContainerFilters) -> EngineResult<Vec<Container>> {
        let mut argv = cli_args(["ps", "--no-trunc", "--format", JSON_FORMAT]);
        if filters.all {
            argv.push("-a".to_string());
        }
        if let Some(id) = &filters.id {
            argv.push("--filter".to_string());
            argv.push(format!("id={id}"));
        }
        if let Some(name) = &filters.name {
            argv.push("--filter".to_string());
            argv.push(format!("name={name}"));
        }

        let rows: Vec<mapping::PsRow> = self.list_rows(&argv).await?;
        Ok(rows.into_iter().filter_map(mapping::container).collect())
    }

    async fn inspect_details(&self, id: &ContainerId) -> EngineResult<InspectDetails> {
        let value = self.inspect_container(id).await?;
        serde_json::from_value(value).map_err(|e| EngineError::Decode(format!("inspect {id}: {e}")))
    }

    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<serde_json::Value> {
        let argv = cli_args(["inspect", "--type", "container", id.as_str()]);
        let output = self.run(&argv, self.timeouts.info).await?;
        let document: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Decode(format!("inspect {id}: {e}")))?;

        match document {
            serde_json::Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| EngineError::NotFound(format!("container {id}"))),
            other @ serde_json::Value::Object(_) => Ok(other),
            _ => Err(EngineError::Decode(format!("inspect {id}: unexpected document"))),
        }
    }

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.run(&cli_args(["start", id.as_str()]), self.timeouts.exec).await?;
        Ok(())
    }

    async fn stop_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.run(&cli_args(["stop", id.as_str()]), self.timeouts.exec).await?;
        Ok(())
    }

    async fn restart_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.run(&cli_args(["restart", id.as_str()]), self.timeouts.exec).await?;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> EngineResult<()> {
        let mut argv = cli_args(["rm"]);
        if force {
            argv.push("-f".to_string());
        }
        argv.push(id.to_string());
        self.run(&argv, self.timeouts.exec).await?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BridgedEngine {
    async fn list_images(&self) -> EngineResult<Vec<Image>> {
        let rows = self
            .list_rows(&cli_args(["images", "--no-trunc", "--format", JSON_FORMAT]))
            .await?;
        Ok(mapping::images(rows))
    }

    async fn remove_image(&self, id: &ImageId, force: bool) -> EngineResult<()> {
        let mut argv = cli_args(["rmi"]);
        if force {
            argv.push("-f".to_string());
        }
        argv.push(id.to_string());
        self.run(&argv, self.timeouts.exec).await?;
        Ok(())
    }
}

#[async_trait]
impl VolumeOps for BridgedEngine {
    async fn list_volumes(&self) -> EngineResult<Vec<Volume>> {
        let rows: Vec<mapping::VolumeRow> = self
            .list_rows(&cli_args(["volume", "ls", "--format", JSON_FORMAT]))
            .await?;
        Ok(rows.into_iter().filter_map(mapping::volume).collect())
    }

    async fn remove_volume(&self, name: &str, force: bool) -> EngineResult<()> {
        let mut argv = cli_args(["volume", "rm"]);
        if force {
            argv.push("-f".to_string());
        }
        argv.push(name.to_string());
        self.run(&argv, self.timeouts.exec).await?;
        Ok(())
    }
}

#[async_trait]
impl NetworkOps for BridgedEngine {
    async fn list_networks(&self) -> EngineResult<Vec<Network>> {
        let rows: Vec<mapping::NetworkRow> = self
            .list_rows(&cli_args(["network", "ls", "--no-trunc", "--format", JSON_FORMAT]))
            .await?;
        Ok(rows.into_iter().filter_map(mapping::network).collect())
    }

    async fn remove_network(&self, id: &NetworkId) -> EngineResult<()> {
        self.run(&cli_args(["network", "rm", id.as_str()]), self.timeouts.exec)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ExecOps for BridgedEngine {
    async fn exec(&self, id: &ContainerId, command: &[String]) -> EngineResult<ExecOutput> {
        self.exec_raw(id, command).await
    }
}

#[async_trait]
impl FileOps for BridgedEngine {
    async fn list_files(&self, id: &ContainerId, path: &str) -> EngineResult<Vec<FileEntry>> {
        let result = self.exec_raw(id, &listing_command(path)).await?;
        let entries = parse_listing(&result.output);
        if entries.is_empty() && result.exit_code.is_some_and(|code| code != 0) {
            return Err(listing_error(path, &result.output));
        }
        Ok(entries)
    }

    async fn download_file(&self, id: &ContainerId, path: &str) -> EngineResult<Bytes> {
        let argv = cli_args(["cp".to_string(), format!("{id}:{path}"), "-".to_string()]);
        let output = self.run(&argv, self.timeouts.exec).await?;
        Ok(Bytes::from(output.stdout))
    }
}

#[async_trait]
impl LogOps for BridgedEngine {
    async fn fetch_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<String> {
        let fetch = LogOptions {
            follow: false,
            ..opts.clone()
        };
        let output = self.run(&Self::log_args(id, &fetch), self.timeouts.exec).await?;
        let mut text = strip_multiplexed(&output.stdout);
        text.push_str(&strip_control(&output.stderr));
        Ok(text)
    }

    async fn stream_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<LogStream> {
        let lines = self
            .bridge
            .stream(&self.binary, &Self::log_args(id, opts))
            .await?;
        // The CLI reports a missing container as the first line, then exits.
        let binary = self.binary.clone();
        Ok(lines
            .scan(true, move |first, line| {
                let head = std::mem::replace(first, false);
                let item = match line {
                    Ok(l) => match head
                        .then(|| mapping::recognize_stream_failure(&binary, &l))
                        .flatten()
                    {
                        Some(error) => Err(error),
                        None => Ok(format!("{}\n", strip_control(&l))),
                    },
                    Err(e) => Err(EngineError::from(e)),
                };
                futures::future::ready(Some(item))
            })
            .boxed())
    }
}

#[async_trait]
impl StatsOps for BridgedEngine {
    async fn container_stats(&self, id: &ContainerId) -> EngineResult<ContainerStats> {
        let argv = cli_args(["stats", "--no-stream", "--format", JSON_FORMAT, id.as_str()]);
        let rows: Vec<mapping::StatsRow> = self.list_rows(&argv).await?;
        rows.first()
            .map(mapping::stats)
            .ok_or_else(|| EngineError::Decode(format!("stats of {id}: no usable sample")))
    }
}

#[async_trait]
impl RuntimeInfo for BridgedEngine {
    fn source(&self) -> Source {
        self.source.clone()
    }

    async fn engine_info(&self) -> EngineResult<serde_json::Value> {
        let output = self
            .run(&cli_args(["info", "--format", JSON_FORMAT]), self.timeouts.info)
            .await?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Decode(format!("engine info: {e}")))
    }

    async fn run_engine_command(&self, program: &str, args: &[String]) -> EngineResult<CommandOutput> {
        let program = if program.is_empty() {
            self.binary.as_str()
        } else {
            program
        };
        Ok(self.bridge.exec(program, args, self.timeouts.exec).await?)
    }

    async fn read_host_file(&self, path: &str) -> EngineResult<Option<String>> {
        let translated = self.bridge.host_path(path);
        let output = self
            .bridge
            .exec("cat", &[translated.clone()], self.timeouts.info)
            .await?;
        if output.success() {
            Ok(Some(output.stdout_text().into_owned()))
        } else {
            tracing::debug!(path = %translated, stderr = %output.stderr.trim(), "host file not readable");
            Ok(None)
        }
    }
}

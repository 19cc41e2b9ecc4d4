//! One-shot subcommands.
//!
//! Each command returns the text to print so `main` owns stdout. With
//! `json` set the raw API payload is pretty-printed instead.

use std::fmt::Write as _;

use anyhow::{bail, Context};
use futures::future::try_join_all;
use serde::Serialize;
use telemetry_models::{AppId, ApplicationLogs, ChatItem, Project, ProjectId};
use telemetry_sdk::TelemetryClient;

use crate::selector::AppSelector;

fn render<T: Serialize>(
    value: &T,
    json: bool,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

pub async fn ready(client: &TelemetryClient) -> anyhow::Result<String> {
    let ready = client
        .ready()
        .await
        .with_context(|| format!("checking {}", client.base_url()))?;
    if !ready {
        bail!("{} is up but not ready", client.base_url());
    }
    Ok(format!("{} is ready", client.base_url()))
}

pub async fn projects(client: &TelemetryClient, json: bool) -> anyhow::Result<String> {
    let projects = client.projects().await.context("listing projects")?;
    render(&projects, json, |projects: &Vec<Project>| {
        let mut out = String::new();
        for p in projects {
            let _ = writeln!(
                out,
                "{:<28} {:>5} apps  last written {}",
                p.id,
                p.num_apps,
                p.last_written.format("%Y-%m-%d %H:%M")
            );
        }
        if out.is_empty() {
            out.push_str("no projects\n");
        }
        out
    })
}

pub async fn apps(
    client: &TelemetryClient,
    project: &ProjectId,
    json: bool,
) -> anyhow::Result<String> {
    let apps = client
        .apps(project)
        .await
        .with_context(|| format!("listing applications of {project}"))?;
    let mut selector = AppSelector::default();
    selector.set_apps(apps);
    render(&selector.apps(), json, |_| {
        let options = selector.options();
        if options.is_empty() {
            format!("no applications in {project}\n")
        } else {
            options.join("\n") + "\n"
        }
    })
}

/// Fetch the logs of several applications concurrently.
pub async fn logs(
    client: &TelemetryClient,
    project: &ProjectId,
    apps: &[AppId],
    json: bool,
) -> anyhow::Result<String> {
    let all = try_join_all(apps.iter().map(|app| client.application_logs(project, app)))
        .await
        .with_context(|| format!("fetching logs in {project}"))?;
    render(&all, json, |all: &Vec<ApplicationLogs>| {
        let mut out = String::new();
        for logs in all {
            let _ = writeln!(out, "== {} ({} steps)", logs.app_id, logs.steps.len());
            for step in &logs.steps {
                let took = step
                    .duration()
                    .map_or_else(|| "-".to_string(), |d| format!("{}ms", d.num_milliseconds()));
                let status = if step.succeeded() { "ok" } else { "FAILED" };
                let _ = writeln!(
                    out,
                    "{:>4}  {:<24} {}  {:>8}  {status}",
                    step.sequence_id,
                    step.action,
                    step.start_time.format("%H:%M:%S"),
                    took
                );
                if let Some(exception) = &step.exception {
                    let _ = writeln!(out, "      {exception}");
                }
            }
        }
        out
    })
}

fn transcript(items: &[ChatItem]) -> String {
    items
        .iter()
        .map(|item| format!("{}: {}\n", item.role.speaker(), item.content))
        .collect()
}

pub async fn chat_history(
    client: &TelemetryClient,
    project: &ProjectId,
    app: &AppId,
    json: bool,
) -> anyhow::Result<String> {
    let items = client
        .chat_history(project, app)
        .await
        .with_context(|| format!("fetching chat history of {app}"))?;
    render(&items, json, |items| transcript(items))
}

pub async fn chat_send(
    client: &TelemetryClient,
    project: &ProjectId,
    app: &AppId,
    prompt: &str,
    json: bool,
) -> anyhow::Result<String> {
    let items = client
        .chat_response(project, app, prompt)
        .await
        .with_context(|| format!("sending prompt to {app}"))?;
    render(&items, json, |items| transcript(items))
}

pub async fn chat_create(
    client: &TelemetryClient,
    project: &ProjectId,
    app: &AppId,
) -> anyhow::Result<String> {
    let created = client
        .create_chat_application(project, app)
        .await
        .with_context(|| format!("creating chat application in {project}"))?;
    Ok(format!("{created}\n"))
}

//! Slash command dispatch for decoded callbacks.

use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::{
    base::{
        prompts,
        types::{Dashboard, Res, Void},
    },
    infoflow::{CallbackEnvelope, MessageOptions, OutboundItem, OutboundMessage},
    runtime::Runtime,
    service::llm::extract,
};

/// Command that asks for dashboard suggestions.
pub const GRAFANA_COMMAND: &str = "grafana";

/// Reply used when the model picks nothing.
pub const NO_MATCH_REPLY: &str = "没有找到匹配的仪表盘，请尝试其他问题";

/// Heading of a successful reply.
pub const RESULT_HEADING: &str = "为您找到如下看板:\n";

/// Handle a callback in the background; the webhook answers before this finishes.
#[instrument(skip_all)]
pub fn dispatch_callback(envelope: CallbackEnvelope, runtime: Runtime) {
    tokio::spawn(async move {
        // Process the callback.
        let result = process_callback(&envelope, &runtime).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Run the command carried by `envelope` and send the reply.
#[instrument(skip_all, fields(group_id = envelope.group_id))]
pub async fn process_callback(envelope: &CallbackEnvelope, runtime: &Runtime) -> Void {
    let command = envelope.message.user_command();

    match command {
        "" => {
            debug!("Ignoring message without a command");
            Ok(())
        }
        GRAFANA_COMMAND => {
            let user_input = envelope.message.user_input();

            match suggest_dashboards(&user_input, runtime).await {
                Ok(dashboards) if !dashboards.is_empty() => notify_result(envelope, &dashboards, runtime).await,
                Ok(_) => {
                    warn!("{}", NO_MATCH_REPLY);
                    notify_error(envelope, NO_MATCH_REPLY, runtime).await
                }
                Err(err) => {
                    let reply = format!("Handle grafana copilot err: {err}");
                    error!("{}", reply);
                    notify_error(envelope, &reply, runtime).await
                }
            }
        }
        other => {
            info!("Unsupported command `{}`", other);
            Ok(())
        }
    }
}

/// Ask the model which dashboards fit `user_input`.
#[instrument(skip_all)]
pub async fn suggest_dashboards(user_input: &str, runtime: &Runtime) -> Res<Vec<Dashboard>> {
    if user_input.is_empty() {
        return Err(anyhow::anyhow!("no user input"));
    }

    let dashboards = runtime
        .dashboards
        .list_dashboards("")
        .await
        .map_err(|err| anyhow::anyhow!("list grafana dashboards err: {err}"))?;

    let prompt = prompts::render_grafana_copilot_prompt(&runtime.config.grafana_copilot_prompt, &dashboards, user_input);
    debug!("LLM input:\n{}", prompt);

    let output = runtime.llm.complete(&prompt).await.map_err(|err| anyhow::anyhow!("get llm response err: {err}"))?;
    debug!("LLM output:\n{}", output);

    Ok(parse_suggestions(extract::extract_text(&output), &runtime.config.grafana_host))
}

/// Parse `title=path` lines into dashboards with absolute URLs under `host`.
pub fn parse_suggestions(text: &str, host: &str) -> Vec<Dashboard> {
    let host = host.trim_end_matches('/');

    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(title, path)| Dashboard {
            uid: String::new(),
            title: title.trim().to_string(),
            url: format!("{}{}", host, path.trim()),
        })
        .collect()
}

async fn notify_result(envelope: &CallbackEnvelope, dashboards: &[Dashboard], runtime: &Runtime) -> Void {
    let mut body = vec![OutboundItem::text(RESULT_HEADING)];

    for dashboard in dashboards {
        body.push(OutboundItem::text(format!("{}: ", dashboard.title)));
        body.push(OutboundItem::link(dashboard.url.as_str()));
    }

    body.push(mention_sender(envelope).at_item());

    let message = OutboundMessage::new(vec![envelope.group_id], body);
    runtime.chat.send_message(&message).await?;

    Ok(())
}

async fn notify_error(envelope: &CallbackEnvelope, reply: &str, runtime: &Runtime) -> Void {
    let message = OutboundMessage::new(vec![envelope.group_id], vec![OutboundItem::text(reply), mention_sender(envelope).at_item()]);
    runtime.chat.send_message(&message).await?;

    Ok(())
}

fn mention_sender(envelope: &CallbackEnvelope) -> MessageOptions {
    MessageOptions::at_users(vec![envelope.message.header.from_user_id.clone()])
}

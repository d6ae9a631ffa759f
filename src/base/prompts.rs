//! Prompt templates for LLM usage.

use crate::base::types::Dashboard;

/// Placeholder replaced with the Markdown table of dashboards.
pub const DASHBOARDS_PLACEHOLDER: &str = "{{dashboards}}";

/// Placeholder replaced with what the user asked for.
pub const USER_INPUT_PLACEHOLDER: &str = "{{user_input}}";

/// Default prompt for the `grafana` command.
pub const GRAFANA_COPILOT_PROMPT: &str = r#####"
# Prime Directive

You are a Grafana copilot living in a group chat.  A user describes what they want to look at, and you pick the dashboards that best match the request from the list below.  You only ever choose from the list; never invent a dashboard, a title, or a path.

## Available Dashboards

The dashboards are given as a Markdown table.  `Title` is the dashboard title, and `Path` is its path on the Grafana host.

{{dashboards}}

## Results

Return at most 5 dashboards, most relevant first.  Put one dashboard per line, formatted as `Title=Path`, using the exact title and path from the table.  Wrap the lines in a single fenced block tagged `text`, and do not return anything else.  For example:

```text
Service Latency=/d/abc123/service-latency
Node Exporter Full=/d/rYdddlPWk/node-exporter-full
```

If nothing in the list matches, return an empty `text` block.

## Input From User

{{user_input}}
"#####;

/// Render the dashboards as a Markdown table with `Title` and `Path` columns.
pub fn dashboards_table(dashboards: &[Dashboard]) -> String {
    let mut table = String::from("|Title|Path|\n|---|---|\n");

    for dashboard in dashboards {
        table.push('|');
        table.push_str(&dashboard.title);
        table.push('|');
        table.push_str(&dashboard.url);
        table.push_str("|\n");
    }

    table
}

/// Substitute the dashboards table and the user input into `template`.
pub fn render_grafana_copilot_prompt(template: &str, dashboards: &[Dashboard], user_input: &str) -> String {
    template.replace(DASHBOARDS_PLACEHOLDER, &dashboards_table(dashboards)).replace(USER_INPUT_PLACEHOLDER, user_input)
}

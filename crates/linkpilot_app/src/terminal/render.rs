use linkpilot_core::{AppViewModel, LogSeverity, NavView, Page, ProgressView, SchedulerView};

const BAR_WIDTH: usize = 30;
const LOG_TAIL: usize = 12;

/// Renders the whole screen for `view` as plain lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![nav_line(view.page, &view.nav), String::new()];
    if let Some(notice) = &view.notice {
        lines.push(format!("! {notice}"));
        lines.push(String::new());
    }

    match view.page {
        Page::Input => render_input(view, &mut lines),
        Page::Progress => render_progress(view, &mut lines),
        Page::Results => render_results(view, &mut lines),
        Page::AutoOpen => render_auto_open(&view.auto_open, view.delay_seconds, &mut lines),
    }
    lines
}

fn nav_line(current: Page, nav: &NavView) -> String {
    [Page::Input, Page::Progress, Page::Results, Page::AutoOpen]
        .into_iter()
        .map(|page| {
            let name = page_name(page);
            if page == current {
                format!("[{name}]")
            } else if nav.allows(page) {
                name.to_string()
            } else {
                format!("({name})")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn page_name(page: Page) -> &'static str {
    match page {
        Page::Input => "Input",
        Page::Progress => "Progress",
        Page::Results => "Results",
        Page::AutoOpen => "Auto-open",
    }
}

fn render_input(view: &AppViewModel, lines: &mut Vec<String>) {
    let links: Vec<&str> = view
        .input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if links.is_empty() {
        lines.push("No links yet. Type `add <link>` or paste links, then `submit`.".to_string());
        return;
    }
    lines.push(format!("{} link(s) ready:", links.len()));
    for (index, link) in links.iter().enumerate() {
        lines.push(format!("  {:>3}. {link}", index + 1));
    }
}

fn render_progress(view: &AppViewModel, lines: &mut Vec<String>) {
    lines.push(view.progress.text.clone());
    lines.push(progress_bar(&view.progress));
    lines.push(format!(
        "Results: {}  Errors: {}",
        view.progress.results_count, view.progress.errors_count
    ));
    if let Some(current) = &view.progress.current {
        lines.push(format!("Current: {current}"));
    }
    if view.log.is_empty() {
        return;
    }
    lines.push(String::new());
    let skip = view.log.len().saturating_sub(LOG_TAIL);
    for line in &view.log[skip..] {
        let marker = match line.severity {
            LogSeverity::Info => ' ',
            LogSeverity::Success => '+',
            LogSeverity::Error => '!',
        };
        lines.push(format!("{marker} {}", line.text));
    }
}

fn progress_bar(progress: &ProgressView) -> String {
    let filled = (progress.percentage.min(100) as usize * BAR_WIDTH) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percentage
    )
}

fn render_results(view: &AppViewModel, lines: &mut Vec<String>) {
    let Some(summary) = view.summary else {
        lines.push("No results yet.".to_string());
        return;
    };
    lines.push(format!(
        "{} successful, {} failed, {} total",
        summary.success_count, summary.error_count, summary.total_count
    ));
    for row in &view.results {
        lines.push(format!("Source #{}: {}", row.number, row.original));
        lines.push(format!("    {}", row.download_uri));
    }
    for row in &view.failures {
        lines.push(format!("Failed #{}: {}", row.number, row.original));
        lines.push(format!("    {}", row.error));
    }
}

fn render_auto_open(auto_open: &SchedulerView, delay_seconds: u32, lines: &mut Vec<String>) {
    lines.push(format!(
        "Status: {}",
        auto_open.status_text.as_deref().unwrap_or("Ready")
    ));
    lines.push(format!("Next link in: {}", auto_open.countdown_text()));
    lines.push(format!("Opened: {}", auto_open.link_progress));
    if let Some(current) = &auto_open.current_link {
        lines.push(format!("Current: {current}"));
    }
    lines.push(format!("Delay: {delay_seconds}s"));

    let mut controls = Vec::new();
    if auto_open.start_visible {
        controls.push("start");
    }
    if auto_open.pause_visible {
        controls.push(if auto_open.pause_label == "Resume" {
            "resume"
        } else {
            "pause"
        });
    }
    if auto_open.stop_visible {
        controls.push("stop");
    }
    if !controls.is_empty() {
        lines.push(format!("Controls: {}", controls.join(", ")));
    }
}

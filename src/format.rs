use textlens_core::{
    AnalysisResult, FinancialCategory, InsightCategory, InsightSubcategory, Party, TimelineEvent,
};

pub struct FormatOptions {
    /// Heading printed above each view, e.g. the provider label.
    pub source: Option<String>,
    /// Widest a financial table cell may grow before it is cut.
    pub max_cell_width: usize,
    pub raw: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            source: None,
            max_cell_width: 40,
            raw: false,
        }
    }
}

pub fn format_result(result: &AnalysisResult, opts: &FormatOptions) -> String {
    let title = match result {
        AnalysisResult::Timeline(_) => "Timeline",
        AnalysisResult::Insights(_) => "Insights",
        AnalysisResult::Financial(_) => "Financial",
        AnalysisResult::Parties(_) => "Parties",
    };

    let mut out = match &opts.source {
        Some(source) => format!("═══ {} ({}) ═══\n", title, source),
        None => format!("═══ {} ═══\n", title),
    };

    if result.is_empty() {
        out.push_str("(nothing found)\n");
        return out;
    }

    let body = match result {
        AnalysisResult::Timeline(events) => format_timeline(events),
        AnalysisResult::Insights(categories) => format_insights(categories),
        AnalysisResult::Financial(categories) => format_financial(categories, opts),
        AnalysisResult::Parties(parties) => format_parties(parties),
    };
    out.push_str(&body);
    out
}

pub fn format_timeline(events: &[TimelineEvent]) -> String {
    let mut out = String::new();
    let last = events.len().saturating_sub(1);

    for (i, event) in events.iter().enumerate() {
        let when = if event.timestamp.is_empty() {
            "(undated)"
        } else {
            event.timestamp.as_str()
        };
        out.push_str(&format!("● {}  {}\n", when, event.title));
        let rail = if i == last { " " } else { "│" };
        for line in event.description.lines().filter(|l| !l.trim().is_empty()) {
            out.push_str(&format!("{}   {}\n", rail, line.trim()));
        }
        if i != last {
            out.push_str("│\n");
        }
    }

    out
}

pub fn format_insights(categories: &[InsightCategory]) -> String {
    let mut out = String::new();

    for category in categories {
        match &category.timestamp {
            Some(ts) if !ts.is_empty() => {
                out.push_str(&format!("{} ({})\n", category.category, ts))
            }
            _ => out.push_str(&format!("{}\n", category.category)),
        }

        let last = category.subcategories.len().saturating_sub(1);
        for (i, sub) in category.subcategories.iter().enumerate() {
            let (branch, indent) = if i == last {
                ("└─", "   ")
            } else {
                ("├─", "│  ")
            };
            out.push_str(&format!("{} {}\n", branch, sub.title));
            format_insight_lists(&mut out, sub, indent);
        }
        out.push('\n');
    }

    out
}

fn format_insight_lists(out: &mut String, sub: &InsightSubcategory, indent: &str) {
    let lists = [
        ("Key Insights", &sub.insights),
        ("Opportunities", &sub.opportunities),
        ("Challenges", &sub.challenges),
    ];
    for (label, items) in lists {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{}  {}:\n", indent, label));
        for item in items {
            out.push_str(&format!("{}    - {}\n", indent, item));
        }
    }
}

const FINANCIAL_HEADERS: [&str; 6] = ["Item", "Value", "Period", "Type", "Parties", "Notes"];

pub fn format_financial(categories: &[FinancialCategory], opts: &FormatOptions) -> String {
    let mut out = String::new();

    for category in categories {
        out.push_str(&format!("─── {} ───\n", category.category));

        let rows: Vec<[String; 6]> = category
            .items
            .iter()
            .map(|item| {
                let parties = match &item.parties {
                    Some(p) if !p.is_empty() => p.join(", "),
                    _ => "-".to_string(),
                };
                [
                    item.metric.clone(),
                    item.value.clone(),
                    item.period.clone(),
                    item.item_type.as_str().to_string(),
                    parties,
                    item.notes.clone(),
                ]
                .map(|cell| clip(&cell, opts))
            })
            .collect();

        let mut widths = FINANCIAL_HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }

        push_row(&mut out, &FINANCIAL_HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(rule.join("─┼─").trim_end());
        out.push('\n');
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        out.push('\n');
    }

    out
}

fn push_row(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    out.push_str(padded.join(" │ ").trim_end());
    out.push('\n');
}

fn clip(cell: &str, opts: &FormatOptions) -> String {
    let cell = cell.replace('\n', " ");
    if opts.raw || cell.chars().count() <= opts.max_cell_width {
        return cell;
    }
    let keep = opts.max_cell_width.saturating_sub(3);
    let cut: String = cell.chars().take(keep).collect();
    format!("{}...", cut)
}

pub fn format_parties(parties: &[Party]) -> String {
    let mut out = String::new();

    for party in parties {
        out.push_str(&format!("┌ {} ({})\n", party.name, party.party_type.as_str()));
        if let Some(ts) = party.timestamp.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("│ {}\n", ts));
        }

        let sections = [
            ("Objectives", &party.objectives),
            ("Mishaps & Setbacks", &party.mishaps),
            ("Results & Outcomes", &party.results),
        ];
        for (label, items) in sections {
            out.push_str(&format!("│ {}:\n", label));
            if items.is_empty() {
                out.push_str("│   (none)\n");
            }
            for item in items {
                out.push_str(&format!("│   - {}\n", item));
            }
        }
        out.push_str("└\n\n");
    }

    out
}

//! 界面渲染
//!
//! 根据 UiState 绘制当前页面：顶部标题栏（终端名、客户、数据模式），中间为页面主体，
//! 底部为提示与快捷键。每个页面一个 draw_* 函数。

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::banking::{BillStatus, TransactionType};
use crate::core::state::{DashboardView, Loadable, ProductView, SimulationView};
use crate::core::{kiosk::DASHBOARD_ERROR, UiState};
use crate::format::{
    bill_due_label, format_account_number, format_currency, format_date, format_relative_time,
    is_bill_urgent, sort_bills_by_due, transaction_symbol,
};
use crate::ui::event::key_hints;
use crate::ui::router::Route;

fn titled(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn bold(s: impl Into<String>) -> Span<'static> {
    Span::styled(s.into(), Style::default().add_modifier(Modifier::BOLD))
}

fn dim(s: impl Into<String>) -> Span<'static> {
    Span::styled(s.into(), Style::default().fg(Color::DarkGray))
}

fn bullet_lines(items: &[String]) -> Vec<Line<'static>> {
    items.iter().map(|i| Line::from(format!(" • {}", i))).collect()
}

/// 加载中 / 失败时的占位；就绪时返回 None，由调用方渲染内容
fn placeholder<T>(state: &Loadable<T>) -> Option<Line<'static>> {
    match state {
        Loadable::Idle => Some(Line::from(dim(" "))),
        Loadable::Loading => Some(Line::from(dim("Loading…"))),
        Loadable::Failed(msg) => Some(Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red)))),
        Loadable::Ready(_) => None,
    }
}

/// 在 area 中居中的固定大小区域
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

/// 绘制一帧
pub fn draw(f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(3)])
        .split(f.area());

    draw_header(f, state, chunks[0]);
    match &state.route {
        Route::Auth => draw_auth(f, state, chunks[1]),
        Route::Dashboard => draw_dashboard(f, &state.dashboard, chunks[1]),
        Route::Product(_) => draw_product(f, &state.product, chunks[1]),
        Route::Simulation => draw_simulation(f, &state.simulation, chunks[1]),
    }
    draw_footer(f, state, chunks[2]);
}

fn draw_header(f: &mut Frame, state: &UiState, area: Rect) {
    let mut spans = vec![bold(state.app_name.clone()), dim(format!("  {}", state.route))];
    if let Some(customer) = &state.customer {
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("[{}] {}", customer.initials(), customer.full_name()),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(dim(format!("  {}", customer.customer_id)));
    }
    if state.mock_mode {
        spans.push(Span::styled("  DEMO DATA", Style::default().fg(Color::Magenta)));
    }
    let header = Paragraph::new(Line::from(spans)).block(titled("Kiosk", Color::Yellow));
    f.render_widget(header, area);
}

fn draw_footer(f: &mut Frame, state: &UiState, area: Rect) {
    let notice = state.notice.clone().unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title_bottom(Line::from(Span::styled(
            key_hints(&state.route, state.auth.otp_step),
            Style::default().fg(Color::DarkGray),
        )));
    f.render_widget(Paragraph::new(notice).block(block), area);
}

fn draw_auth(f: &mut Frame, state: &UiState, area: Rect) {
    let auth = &state.auth;
    let boxed = centered(area, 64, 14);
    let mut lines = Vec::new();

    if auth.otp_step {
        lines.push(Line::from(bold("Verify OTP")));
        lines.push(Line::from(format!(
            "Enter the 6-digit code sent for {}",
            auth.masked_identifier
        )));
        lines.push(Line::from(""));
        let mut slots = String::new();
        for i in 0..crate::auth::flow::OTP_LENGTH {
            slots.push_str(&format!("[{}] ", auth.otp.chars().nth(i).unwrap_or(' ')));
        }
        lines.push(Line::from(Span::styled(slots, Style::default().fg(Color::Cyan))));
        lines.push(Line::from(""));
        if auth.can_resend {
            lines.push(Line::from(Span::styled(
                "OTP has expired. Press F2 to resend.",
                Style::default().fg(Color::Yellow),
            )));
        } else {
            lines.push(Line::from(dim(format!("Resend OTP in {}", auth.countdown_label))));
        }
    } else {
        lines.push(Line::from(bold("Welcome")));
        lines.push(Line::from("Enter your Customer ID or registered mobile number"));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("> {}_", auth.input),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(dim("Leave empty to use the demo customer")));
    }

    lines.push(Line::from(""));
    if auth.busy {
        lines.push(Line::from(dim(if auth.otp_step { "Verifying…" } else { "Sending OTP…" })));
    }
    if let Some(err) = &auth.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    } else if let Some(notice) = &auth.notice {
        lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Green))));
    }

    let color = if auth.error.is_some() { Color::Red } else { Color::Blue };
    let title = if auth.otp_step { "Two-step verification" } else { "Customer login" };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(titled(title, color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, boxed);
}

fn draw_dashboard(f: &mut Frame, view: &DashboardView, area: Rect) {
    if view.failed() {
        let panel = Paragraph::new(DASHBOARD_ERROR)
            .block(titled("Error", Color::Red))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(panel, centered(area, 70, 5));
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Percentage(45), Constraint::Min(6)])
        .split(area);
    let top = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(rows[0]);
    let middle = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);
    let now = Utc::now();

    // 余额与上次到访
    let (balances, visit) = match (placeholder(&view.data), view.data.ready()) {
        (Some(line), _) => (vec![line.clone()], vec![line]),
        (None, Some(d)) => (
            vec![
                Line::from(vec![Span::raw("Total     "), bold(format_currency(d.total_balance))]),
                Line::from(format!("Savings   {}", format_currency(d.savings_balance))),
                Line::from(format!("Checking  {}", format_currency(d.checking_balance))),
                Line::from(dim(format!(
                    "{} · {}",
                    d.customer.account_type,
                    format_account_number(&d.customer.account_number)
                ))),
            ],
            vec![
                Line::from(bold(format_date(&d.last_visit.date))),
                Line::from(format_relative_time(&d.last_visit.date, now)),
                Line::from(d.last_visit.branch.clone()),
                Line::from(dim(d.last_visit.purpose.clone())),
            ],
        ),
        (None, None) => (Vec::new(), Vec::new()),
    };
    f.render_widget(Paragraph::new(balances).block(titled("Balances", Color::Green)), top[0]);
    f.render_widget(Paragraph::new(visit).block(titled("Last visit", Color::Green)), top[1]);

    // 最近交易
    let transactions: Vec<Line> = match (placeholder(&view.data), view.data.ready()) {
        (Some(line), _) => vec![line],
        (None, Some(d)) if d.recent_transactions.is_empty() => vec![Line::from(dim("No recent transactions"))],
        (None, Some(d)) => d
            .recent_transactions
            .iter()
            .map(|t| {
                let color = match t.kind {
                    TransactionType::Credit => Color::Green,
                    TransactionType::Debit => Color::Red,
                };
                Line::from(vec![
                    dim(format!("{}  ", format_date(&t.date))),
                    Span::raw(format!("{:<28}", t.description)),
                    Span::styled(
                        format!("{}{}", transaction_symbol(t.kind), format_currency(t.amount)),
                        Style::default().fg(color),
                    ),
                ])
            })
            .collect(),
        (None, None) => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(transactions).block(titled("Recent transactions", Color::Blue)),
        middle[0],
    );

    // 待缴账单
    let mut bills_title = "Upcoming bills".to_string();
    let bills: Vec<Line> = match (placeholder(&view.data), view.data.ready()) {
        (Some(line), _) => vec![line],
        (None, Some(d)) if d.upcoming_bills.is_empty() => vec![Line::from(dim("No upcoming bills"))],
        (None, Some(d)) => {
            let overdue = d.upcoming_bills.iter().filter(|b| b.status == BillStatus::Overdue).count();
            if overdue > 0 {
                bills_title = format!("Upcoming bills · {} overdue", overdue);
            }
            sort_bills_by_due(&d.upcoming_bills)
                .iter()
                .map(|b| {
                    let color = if b.status == BillStatus::Overdue {
                        Color::Red
                    } else if is_bill_urgent(b, now) {
                        Color::Yellow
                    } else {
                        Color::Reset
                    };
                    Line::from(vec![
                        Span::styled(format!("{:<26}", b.provider), Style::default().fg(color)),
                        Span::raw(format!("{:>12}  ", format_currency(b.amount))),
                        dim(format!("{} · {} · {}", b.kind.label(), b.status.label(), bill_due_label(b, now))),
                    ])
                })
                .collect()
        }
        (None, None) => Vec::new(),
    };
    f.render_widget(Paragraph::new(bills).block(titled(&bills_title, Color::Blue)), middle[1]);

    draw_catalogue(f, view, rows[2]);
}

fn draw_catalogue(f: &mut Frame, view: &DashboardView, area: Rect) {
    let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    if let Some(line) = placeholder(&view.products) {
        f.render_widget(Paragraph::new(line).block(titled("Products for you", Color::Magenta)), area);
        return;
    }

    let catalogue = view.catalogue();
    let items: Vec<ListItem> = catalogue
        .iter()
        .map(|p| {
            let mut spans = vec![Span::raw(format!("{:<28}", p.name)), dim(format!("{:<11}", p.category.as_str()))];
            if view.recommendation_for(&p.id).is_some() {
                spans.push(Span::styled("★ Recommended", Style::default().fg(Color::Yellow)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let list = List::new(items)
        .block(titled("Products for you", Color::Magenta))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    if !catalogue.is_empty() {
        list_state.select(Some(view.selected.min(catalogue.len() - 1)));
    }
    f.render_stateful_widget(list, cols[0], &mut list_state);

    let mut detail = Vec::new();
    if let Some(p) = list_state.selected().and_then(|i| catalogue.get(i)) {
        detail.push(Line::from(bold(p.name.clone())));
        detail.push(Line::from(p.description.clone()));
        if let Some(rate) = p.interest_rate {
            detail.push(Line::from(format!("Interest from {:.2}% p.a.", rate)));
        }
        if let Some(rec) = view.recommendation_for(&p.id) {
            detail.push(Line::from(""));
            detail.push(Line::from(Span::styled(
                format!("Why: {}", rec.reason),
                Style::default().fg(Color::Yellow),
            )));
            if let Some(benefits) = &rec.personalized_benefits {
                detail.extend(bullet_lines(benefits));
            }
        } else if view.recommendations.is_loading() {
            detail.push(Line::from(dim("Personalising…")));
        }
    }
    f.render_widget(
        Paragraph::new(detail)
            .block(titled("Details", Color::Magenta))
            .wrap(Wrap { trim: true }),
        cols[1],
    );
}

fn draw_product(f: &mut Frame, view: &ProductView, area: Rect) {
    let product = match (&view.product, view.product.ready()) {
        (_, Some(p)) => p,
        (Loadable::Failed(msg), _) => {
            let panel = Paragraph::new(msg.clone())
                .block(titled("Product", Color::Red))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(panel, centered(area, 70, 5));
            return;
        }
        _ => {
            f.render_widget(
                Paragraph::new(dim("Loading product…")).block(titled("Product", Color::Blue)),
                area,
            );
            return;
        }
    };

    let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(40), Constraint::Min(4)])
        .split(cols[1]);

    let mut lines = vec![
        Line::from(vec![bold(product.name.clone()), dim(format!("  {}", product.category.as_str()))]),
        Line::from(product.description.clone()),
        Line::from(""),
    ];
    if let Some(rate) = product.interest_rate {
        lines.push(Line::from(format!("Interest rate: {:.2}% p.a.", rate)));
    }
    if let Some(tenure) = &product.tenure {
        lines.push(Line::from(format!("Tenure: {}", tenure)));
    }
    match (product.min_amount, product.max_amount) {
        (Some(min), Some(max)) => lines.push(Line::from(format!(
            "Amount: {} - {}",
            format_currency(min),
            format_currency(max)
        ))),
        (Some(min), None) => lines.push(Line::from(format!("Minimum: {}", format_currency(min)))),
        _ => {}
    }
    lines.push(Line::from(""));
    lines.push(Line::from(bold("Features")));
    lines.extend(bullet_lines(&product.features));
    lines.push(Line::from(""));
    lines.push(Line::from(bold("Eligibility")));
    lines.extend(bullet_lines(&product.eligibility));
    f.render_widget(
        Paragraph::new(lines)
            .block(titled("Product details", Color::Blue))
            .wrap(Wrap { trim: true }),
        cols[0],
    );

    let eligibility = match (placeholder(&view.eligibility), view.eligibility.ready()) {
        (Some(line), _) => vec![line],
        (None, Some(e)) => {
            let mut l = vec![match e.verdict {
                Some(true) => Line::from(Span::styled("✓ You are eligible", Style::default().fg(Color::Green))),
                Some(false) => Line::from(Span::styled("Eligibility needs review", Style::default().fg(Color::Yellow))),
                None => Line::from(dim("Requirements for this product:")),
            }];
            l.extend(bullet_lines(&e.requirements));
            if let Some(docs) = &e.documents_required {
                l.push(Line::from(dim("Documents:")));
                l.extend(bullet_lines(docs));
            }
            if let Some(info) = &e.additional_info {
                l.push(Line::from(dim(info.clone())));
            }
            l
        }
        (None, None) => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(eligibility).block(titled("Your eligibility", Color::Green)).wrap(Wrap { trim: true }),
        right[0],
    );

    let rates = match (placeholder(&view.rates), view.rates.ready()) {
        (Some(line), _) => vec![line],
        (None, Some(r)) => {
            let mut l: Vec<Line> = r
                .rates
                .iter()
                .map(|rate| {
                    Line::from(format!(
                        "{}: {}{}",
                        rate.rate_type,
                        rate.rate,
                        rate.conditions.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default()
                    ))
                })
                .collect();
            for fee in r.fees.iter().flatten() {
                l.push(Line::from(format!("{}: {}", fee.fee_type, fee.amount)));
            }
            if let Some(terms) = &r.terms {
                l.extend(bullet_lines(terms));
            }
            l
        }
        (None, None) => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(rates).block(titled("Rates & fees", Color::Green)).wrap(Wrap { trim: true }),
        right[1],
    );

    let contact = match &view.contact {
        Loadable::Idle => Line::from("Need help? Press c to have an agent call you."),
        Loadable::Loading => Line::from(dim("Submitting request…")),
        Loadable::Ready(resp) => Line::from(Span::styled(
            format!("Ticket {} · {}", resp.ticket_id, resp.message),
            Style::default().fg(Color::Green),
        )),
        Loadable::Failed(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
    };
    f.render_widget(
        Paragraph::new(contact).block(titled("Contact agent", Color::Yellow)).wrap(Wrap { trim: true }),
        right[2],
    );
}

fn draw_simulation(f: &mut Frame, view: &SimulationView, area: Rect) {
    let mut lines = vec![
        Line::from(bold("Business scenario")),
        Line::from(" • Annual Revenue: $100,000 USD"),
        Line::from(" • Business Type: Small Business"),
        Line::from(" • Financing Need: Equipment Finance Loan"),
        Line::from(""),
    ];
    match &view.result {
        Loadable::Idle => lines.push(Line::from(dim("Press Enter to get product recommendations"))),
        Loadable::Loading => lines.push(Line::from(dim("Getting AI recommendations…"))),
        Loadable::Failed(msg) => lines.push(Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red)))),
        Loadable::Ready(result) => {
            if let Some(best) = &result.best_match {
                lines.push(Line::from(vec![
                    Span::styled("Best match: ", Style::default().fg(Color::Green)),
                    bold(best.clone()),
                ]));
                lines.push(Line::from(""));
            }
            for rec in &result.recommendations {
                lines.push(Line::from(Span::styled(rec.product_name.clone(), Style::default().fg(Color::Cyan))));
                lines.push(Line::from(rec.reason.clone()));
                if let Some(benefits) = &rec.benefits {
                    lines.extend(bullet_lines(benefits));
                }
                lines.push(Line::from(""));
            }
        }
    }
    f.render_widget(
        Paragraph::new(lines)
            .block(titled("Product recommendation simulation", Color::Magenta))
            .wrap(Wrap { trim: true }),
        area,
    );
}

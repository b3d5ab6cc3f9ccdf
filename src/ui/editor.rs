use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::locale;
use crate::money;
use crate::store::{ClientField, CompanyField, InvoiceField, InvoiceStore, ItemField};
use crate::ui::components::date_input::DateInput;

/// How long to wait for a key before letting the event loop tick (toasts
/// dismiss and background notices drain on ticks).
const POLL_INTERVAL: Duration = Duration::from_millis(200);

// Form cursor, top to bottom.
#[derive(Clone, Copy, PartialEq)]
pub enum EditorField {
    CompanyName,
    CompanyAddress,
    CompanySubAddress,
    CompanyPhone,
    Logo,
    ClientName,
    ClientAddress,
    ClientPhone,
    Status,
    Date,
    DueDate,
    Items,
    Discount,
    Notes,
}

impl EditorField {
    fn next(self) -> Self {
        match self {
            EditorField::CompanyName => EditorField::CompanyAddress,
            EditorField::CompanyAddress => EditorField::CompanySubAddress,
            EditorField::CompanySubAddress => EditorField::CompanyPhone,
            EditorField::CompanyPhone => EditorField::Logo,
            EditorField::Logo => EditorField::ClientName,
            EditorField::ClientName => EditorField::ClientAddress,
            EditorField::ClientAddress => EditorField::ClientPhone,
            EditorField::ClientPhone => EditorField::Status,
            EditorField::Status => EditorField::Date,
            EditorField::Date => EditorField::DueDate,
            EditorField::DueDate => EditorField::Items,
            EditorField::Items => EditorField::Discount,
            EditorField::Discount => EditorField::Notes,
            EditorField::Notes => EditorField::CompanyName,
        }
    }

    fn previous(self) -> Self {
        match self {
            EditorField::CompanyName => EditorField::Notes,
            EditorField::CompanyAddress => EditorField::CompanyName,
            EditorField::CompanySubAddress => EditorField::CompanyAddress,
            EditorField::CompanyPhone => EditorField::CompanySubAddress,
            EditorField::Logo => EditorField::CompanyPhone,
            EditorField::ClientName => EditorField::Logo,
            EditorField::ClientAddress => EditorField::ClientName,
            EditorField::ClientPhone => EditorField::ClientAddress,
            EditorField::Status => EditorField::ClientPhone,
            EditorField::Date => EditorField::Status,
            EditorField::DueDate => EditorField::Date,
            EditorField::Items => EditorField::DueDate,
            EditorField::Discount => EditorField::Items,
            EditorField::Notes => EditorField::Discount,
        }
    }
}

pub struct EditorState {
    current_field: EditorField,
    editing: bool,
    input: String,
    date_input: Option<DateInput>,
    items_state: ListState,
    editing_item: Option<(String, ItemField, String)>,
    confirming_new: bool,
    share_prompt: Option<String>,
}

pub enum EditorAction {
    Quit,
    SaveDraft,
    NewInvoice,
    Print,
    ExportPdf,
    Share(String),
    LoadLogo(String),
    ClearLogo,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            current_field: EditorField::ClientName,
            editing: false,
            input: String::new(),
            date_input: None,
            items_state: ListState::default(),
            editing_item: None,
            confirming_new: false,
            share_prompt: None,
        }
    }

    pub fn is_confirming_new(&self) -> bool {
        self.confirming_new
    }

    pub fn share_prompt(&self) -> Option<&str> {
        self.share_prompt.as_deref()
    }

    fn start_editing(&mut self, store: &InvoiceStore) {
        let invoice = store.invoice();
        let company = store.company();
        self.input = match self.current_field {
            EditorField::CompanyName => company.name.clone(),
            EditorField::CompanyAddress => company.address.clone(),
            EditorField::CompanySubAddress => company.sub_address.clone(),
            EditorField::CompanyPhone => company.phone.clone(),
            // Logo editing means typing a path to load; start blank.
            EditorField::Logo => String::new(),
            EditorField::ClientName => client_text(store, ClientField::Name),
            EditorField::ClientAddress => client_text(store, ClientField::Address),
            EditorField::ClientPhone => client_text(store, ClientField::Phone),
            EditorField::Discount => {
                if invoice.discount == 0.0 {
                    String::new()
                } else {
                    invoice.discount.to_string()
                }
            }
            EditorField::Notes => invoice.notes.clone(),
            _ => String::new(),
        };
        match self.current_field {
            EditorField::Date => self.date_input = Some(DateInput::new(&invoice.date)),
            EditorField::DueDate => self.date_input = Some(DateInput::new(&invoice.due_date)),
            EditorField::Items => {
                if self.items_state.selected().is_none() && !invoice.items.is_empty() {
                    self.items_state.select(Some(0));
                }
            }
            _ => {}
        }
        self.editing = true;
    }

    fn stop_editing(&mut self) {
        self.editing = false;
        self.date_input = None;
        self.editing_item = None;
        self.input.clear();
    }

    /// Push the current text buffer into the store. Called on every
    /// keystroke so the preview tracks the form live.
    fn commit_input(&self, store: &mut InvoiceStore) {
        match self.current_field {
            EditorField::CompanyName => store.set_company_field(CompanyField::Name, &self.input),
            EditorField::CompanyAddress => {
                store.set_company_field(CompanyField::Address, &self.input)
            }
            EditorField::CompanySubAddress => {
                store.set_company_field(CompanyField::SubAddress, &self.input)
            }
            EditorField::CompanyPhone => store.set_company_field(CompanyField::Phone, &self.input),
            EditorField::ClientName => store.set_client_field(ClientField::Name, &self.input),
            EditorField::ClientAddress => store.set_client_field(ClientField::Address, &self.input),
            EditorField::ClientPhone => store.set_client_field(ClientField::Phone, &self.input),
            EditorField::Discount => store.set_field(InvoiceField::Discount, &self.input),
            EditorField::Notes => store.set_field(InvoiceField::Notes, &self.input),
            _ => {}
        }
    }

    fn selected_item_id(&self, store: &InvoiceStore) -> Option<String> {
        let selected = self.items_state.selected()?;
        store
            .invoice()
            .items
            .get(selected)
            .map(|item| item.id.clone())
    }

    fn select_step(&mut self, store: &InvoiceStore, down: bool) {
        let len = store.invoice().items.len();
        if len == 0 {
            return;
        }
        let next = match self.items_state.selected() {
            Some(i) if down => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.items_state.select(Some(next));
    }

    /// Advance the item editor: description, quantity, price, done.
    fn next_item_field(&mut self, store: &InvoiceStore) {
        let Some((id, field, _)) = self.editing_item.take() else {
            return;
        };
        let Some(item) = store.invoice().items.iter().find(|item| item.id == id) else {
            return;
        };
        self.editing_item = match field {
            ItemField::Description => {
                Some((id, ItemField::Quantity, item.quantity.to_string()))
            }
            ItemField::Quantity => {
                let seed = if item.unit_price == 0.0 {
                    String::new()
                } else {
                    item.unit_price.to_string()
                };
                Some((id, ItemField::UnitPrice, seed))
            }
            ItemField::UnitPrice => None,
        };
    }
}

pub fn handle_input(
    state: &mut EditorState,
    store: &mut InvoiceStore,
) -> Result<Option<EditorAction>> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(None);
    }
    let Event::Key(key) = event::read()? else {
        return Ok(None);
    };

    // Modal dialogs swallow everything first.
    if state.confirming_new {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                state.confirming_new = false;
                return Ok(Some(EditorAction::NewInvoice));
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.confirming_new = false;
            }
            _ => {}
        }
        return Ok(None);
    }
    if let Some(buffer) = state.share_prompt.as_mut() {
        match key.code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let phone = state.share_prompt.take().unwrap_or_default();
                return Ok(Some(EditorAction::Share(phone)));
            }
            KeyCode::Esc => state.share_prompt = None,
            _ => {}
        }
        return Ok(None);
    }

    if !state.editing {
        match key.code {
            KeyCode::Char('q') => return Ok(Some(EditorAction::Quit)),
            KeyCode::Char('s') => return Ok(Some(EditorAction::SaveDraft)),
            KeyCode::Char('n') => state.confirming_new = true,
            KeyCode::Char('p') => return Ok(Some(EditorAction::Print)),
            KeyCode::Char('e') => return Ok(Some(EditorAction::ExportPdf)),
            KeyCode::Char('w') => {
                // Prefill with the phone already on the invoice.
                state.share_prompt = Some(client_text(store, ClientField::Phone));
            }
            KeyCode::Char('x') if state.current_field == EditorField::Logo => {
                return Ok(Some(EditorAction::ClearLogo));
            }
            KeyCode::Up => state.current_field = state.current_field.previous(),
            KeyCode::Down | KeyCode::Tab => state.current_field = state.current_field.next(),
            KeyCode::Enter => match state.current_field {
                // The status selector cycles in place, no editing mode.
                EditorField::Status => {
                    let next = store.invoice().status.next();
                    store.set_field(InvoiceField::Status, next.label());
                }
                _ => state.start_editing(store),
            },
            _ => {}
        }
        return Ok(None);
    }

    // Editing mode.
    match state.current_field {
        EditorField::Date | EditorField::DueDate => match key.code {
            KeyCode::Esc | KeyCode::Enter => state.stop_editing(),
            code => {
                if let Some(date_input) = state.date_input.as_mut() {
                    date_input.handle_key(code);
                    let field = if state.current_field == EditorField::Date {
                        InvoiceField::Date
                    } else {
                        InvoiceField::DueDate
                    };
                    store.set_field(field, &date_input.iso());
                }
            }
        },
        EditorField::Items => {
            if state.editing_item.is_some() {
                match key.code {
                    KeyCode::Esc => state.editing_item = None,
                    KeyCode::Enter | KeyCode::Tab => state.next_item_field(store),
                    KeyCode::Char(c) => {
                        if let Some((id, field, buffer)) = state.editing_item.as_mut() {
                            buffer.push(c);
                            store.set_item_field(&id.clone(), *field, &buffer.clone());
                        }
                    }
                    KeyCode::Backspace => {
                        if let Some((id, field, buffer)) = state.editing_item.as_mut() {
                            buffer.pop();
                            store.set_item_field(&id.clone(), *field, &buffer.clone());
                        }
                    }
                    _ => {}
                }
            } else {
                match key.code {
                    KeyCode::Esc => state.stop_editing(),
                    KeyCode::Up => state.select_step(store, false),
                    KeyCode::Down => state.select_step(store, true),
                    KeyCode::Char('a') => {
                        store.add_item();
                        let last = store.invoice().items.len() - 1;
                        state.items_state.select(Some(last));
                    }
                    KeyCode::Char('d') => {
                        // Removing the last remaining line is a silent no-op.
                        if let Some(id) = state.selected_item_id(store) {
                            store.remove_item(&id);
                            let len = store.invoice().items.len();
                            if let Some(selected) = state.items_state.selected() {
                                if selected >= len {
                                    state.items_state.select(Some(len - 1));
                                }
                            }
                        }
                    }
                    KeyCode::Enter => {
                        if let Some(id) = state.selected_item_id(store) {
                            let description = store
                                .invoice()
                                .items
                                .iter()
                                .find(|item| item.id == id)
                                .map(|item| item.description.clone())
                                .unwrap_or_default();
                            state.editing_item = Some((id, ItemField::Description, description));
                        }
                    }
                    _ => {}
                }
            }
        }
        EditorField::Logo => match key.code {
            KeyCode::Esc => state.stop_editing(),
            KeyCode::Enter => {
                let path = state.input.clone();
                state.stop_editing();
                if !path.trim().is_empty() {
                    return Ok(Some(EditorAction::LoadLogo(path)));
                }
            }
            KeyCode::Char(c) => state.input.push(c),
            KeyCode::Backspace => {
                state.input.pop();
            }
            _ => {}
        },
        _ => match key.code {
            KeyCode::Esc | KeyCode::Enter => state.stop_editing(),
            KeyCode::Char(c) => {
                state.input.push(c);
                state.commit_input(store);
            }
            KeyCode::Backspace => {
                state.input.pop();
                state.commit_input(store);
            }
            _ => {}
        },
    }

    Ok(None)
}

pub fn help_text(state: &EditorState) -> &'static str {
    if state.confirming_new {
        return "Y - تأكيد | N - إلغاء";
    }
    if state.share_prompt.is_some() {
        return "Enter - إرسال | Esc - إلغاء";
    }
    if !state.editing {
        return "Enter - تعديل | Up/Down - تنقل | S - حفظ | N - جديد | P - طباعة | E - تصدير PDF | W - واتساب | Q - خروج";
    }
    match state.current_field {
        EditorField::Date | EditorField::DueDate => {
            "أرقام - إدخال | Left/Right - جزء التاريخ | Enter - تم"
        }
        EditorField::Items => {
            if state.editing_item.is_some() {
                "Enter/Tab - الحقل التالي | Esc - إلغاء"
            } else {
                "A - إضافة صنف | D - حذف | Enter - تعديل الصنف | Esc - تم"
            }
        }
        EditorField::Logo => "اكتب مسار ملف الصورة ثم Enter | Esc - إلغاء",
        _ => "اكتب مباشرة | Enter - تم | Esc - إلغاء",
    }
}

fn client_text(store: &InvoiceStore, field: ClientField) -> String {
    let Some(client) = store.invoice().client.as_ref() else {
        return String::new();
    };
    match field {
        ClientField::Name => client.name.clone(),
        ClientField::Address => client.address.clone(),
        ClientField::Phone => client.phone.clone(),
    }
}

pub fn render_form<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut EditorState,
    store: &InvoiceStore,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(7), // Company
                Constraint::Length(8), // Client & meta
                Constraint::Min(6),    // Items
                Constraint::Length(4), // Discount & notes
            ]
            .as_ref(),
        )
        .split(area);

    render_company_section(frame, state, store, chunks[0]);
    render_client_section(frame, state, store, chunks[1]);
    render_items_section(frame, state, store, chunks[2]);
    render_misc_section(frame, state, store, chunks[3]);
}

fn field_line<'a>(
    label: &'a str,
    value: String,
    focused: bool,
    editing: bool,
    buffer: &str,
) -> Spans<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let shown = if focused && editing {
        format!("{buffer}|")
    } else {
        value
    };
    Spans::from(vec![
        Span::styled(format!("{label}: "), label_style),
        Span::raw(shown),
    ])
}

fn render_company_section<B: Backend>(
    frame: &mut Frame<B>,
    state: &EditorState,
    store: &InvoiceStore,
    area: Rect,
) {
    let company = store.company();
    let editing = state.editing;
    let f = state.current_field;

    let logo_value = match &company.logo_url {
        Some(_) => "(شعار مضمّن) — X لحذفه".to_string(),
        None => "لا يوجد شعار".to_string(),
    };

    let lines = vec![
        field_line(
            "اسم الشركة",
            company.name.clone(),
            f == EditorField::CompanyName,
            editing,
            &state.input,
        ),
        field_line(
            "العنوان",
            company.address.clone(),
            f == EditorField::CompanyAddress,
            editing,
            &state.input,
        ),
        field_line(
            "العنوان التفصيلي",
            company.sub_address.clone(),
            f == EditorField::CompanySubAddress,
            editing,
            &state.input,
        ),
        field_line(
            "هاتف الشركة",
            company.phone.clone(),
            f == EditorField::CompanyPhone,
            editing,
            &state.input,
        ),
        field_line(
            "الشعار",
            logo_value,
            f == EditorField::Logo,
            editing,
            &state.input,
        ),
    ];

    let section = Paragraph::new(lines)
        .block(Block::default().title("بيانات الشركة").borders(Borders::ALL));
    frame.render_widget(section, area);
}

fn render_client_section<B: Backend>(
    frame: &mut Frame<B>,
    state: &EditorState,
    store: &InvoiceStore,
    area: Rect,
) {
    let invoice = store.invoice();
    let editing = state.editing;
    let f = state.current_field;

    let date_value = |field: EditorField, stored: &str| -> String {
        if f == field && editing {
            state
                .date_input
                .as_ref()
                .map(|d| d.display())
                .unwrap_or_else(|| stored.to_string())
        } else {
            stored.to_string()
        }
    };

    let lines = vec![
        field_line(
            "اسم العميل",
            client_text(store, ClientField::Name),
            f == EditorField::ClientName,
            editing,
            &state.input,
        ),
        field_line(
            "عنوان العميل",
            client_text(store, ClientField::Address),
            f == EditorField::ClientAddress,
            editing,
            &state.input,
        ),
        field_line(
            "هاتف العميل",
            client_text(store, ClientField::Phone),
            f == EditorField::ClientPhone,
            editing,
            &state.input,
        ),
        field_line(
            "حالة الفاتورة",
            format!("{} (Enter للتبديل)", invoice.status.label()),
            f == EditorField::Status,
            false,
            "",
        ),
        Spans::from(vec![
            Span::styled(
                "تاريخ الفاتورة: ",
                if f == EditorField::Date {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                },
            ),
            Span::raw(date_value(EditorField::Date, &invoice.date)),
        ]),
        Spans::from(vec![
            Span::styled(
                "تاريخ الاستحقاق: ",
                if f == EditorField::DueDate {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                },
            ),
            Span::raw(date_value(EditorField::DueDate, &invoice.due_date)),
        ]),
    ];

    let section = Paragraph::new(lines).block(
        Block::default()
            .title("بيانات العميل والفاتورة")
            .borders(Borders::ALL),
    );
    frame.render_widget(section, area);
}

fn render_items_section<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut EditorState,
    store: &InvoiceStore,
    area: Rect,
) {
    let invoice = store.invoice();
    let focused = state.current_field == EditorField::Items;
    let block = Block::default()
        .title("الأصناف والخدمات")
        .borders(Borders::ALL)
        .style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });

    if let Some((id, active_field, buffer)) = &state.editing_item {
        // Inline item editor replaces the list while a line is open.
        let item = invoice.items.iter().find(|item| &item.id == id);
        let value = |field: ItemField, current: String| -> String {
            if *active_field == field {
                format!("{buffer}|")
            } else {
                current
            }
        };
        let (description, quantity, price) = match item {
            Some(item) => (
                item.description.clone(),
                item.quantity.to_string(),
                item.unit_price.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let lines = vec![
            Spans::from(format!(
                "الوصف: {}",
                value(ItemField::Description, description)
            )),
            Spans::from(format!("الكمية: {}", value(ItemField::Quantity, quantity))),
            Spans::from(format!("السعر: {}", value(ItemField::UnitPrice, price))),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let items: Vec<ListItem> = invoice
        .items
        .iter()
        .map(|item| {
            let description = if item.description.is_empty() {
                "(بدون وصف)"
            } else {
                item.description.as_str()
            };
            ListItem::new(format!(
                "{} — {} × {} = {}",
                description,
                item.quantity,
                locale::format_currency(item.unit_price),
                locale::format_currency(money::line_total(item)),
            ))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_stateful_widget(list, area, &mut state.items_state);
}

fn render_misc_section<B: Backend>(
    frame: &mut Frame<B>,
    state: &EditorState,
    store: &InvoiceStore,
    area: Rect,
) {
    let invoice = store.invoice();
    let editing = state.editing;
    let f = state.current_field;

    let discount_value = if invoice.discount == 0.0 {
        String::new()
    } else {
        invoice.discount.to_string()
    };

    let lines = vec![
        field_line(
            "قيمة الخصم (جنيه مصري)",
            discount_value,
            f == EditorField::Discount,
            editing,
            &state.input,
        ),
        field_line(
            "ملاحظات إضافية",
            invoice.notes.clone(),
            f == EditorField::Notes,
            editing,
            &state.input,
        ),
    ];

    let section = Paragraph::new(lines)
        .block(Block::default().title("الخصم والملاحظات").borders(Borders::ALL));
    frame.render_widget(section, area);
}

use std::{
    io::{self, Write as _},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::normalize_base_url, load_settings, ContactEditor, ContactGateway,
    HttpContactGateway, ListController, ListEvent, ListView,
};
use shared::domain::SortDirection;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

mod command;

use command::{Command, HELP};

type InputLines = Lines<BufReader<Stdin>>;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides `api_base_url` from contacts.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "asc")]
    order: SortDirection,
    /// Print the first result and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.api_url {
        settings.api_base_url = normalize_base_url(url);
    }
    if let Some(ms) = args.debounce_ms {
        settings.search_debounce = Duration::from_millis(ms);
    }
    tracing::info!(api = %settings.api_base_url, "starting contacts terminal");

    let gateway: Arc<dyn ContactGateway> = Arc::new(
        HttpContactGateway::new(&settings).context("failed to set up the contacts api client")?,
    );
    let controller = Arc::new(ListController::new(Arc::clone(&gateway), &settings));
    let mut events = controller.subscribe();

    controller.mount();
    if args.order == SortDirection::Descending {
        controller.toggle_sort();
    }
    controller.set_search_text(args.search.clone());

    if args.once {
        loop {
            match events.recv().await.context("list controller stopped")? {
                ListEvent::Refreshed { .. } => {
                    render(&controller.view());
                    return Ok(());
                }
                ListEvent::Failed(notice) => anyhow::bail!("{notice}"),
                ListEvent::ContactDeleted { .. } => {}
            }
        }
    }

    let renderer = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                match event {
                    ListEvent::Refreshed { .. } => render(&controller.view()),
                    ListEvent::ContactDeleted { id } => println!("contact {id} deleted"),
                    ListEvent::Failed(notice) => println!("error: {notice}"),
                }
            }
        })
    };

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Search(text) => controller.on_search_input(text),
            Command::ToggleSort => {
                let sort = controller.toggle_sort();
                println!("ordering by name {sort}");
            }
            Command::Refresh => controller.refresh(),
            Command::Show => render(&controller.view()),
            Command::New => {
                let editor = ContactEditor::create(Arc::clone(&gateway));
                run_editor(editor, &mut lines, &controller).await?;
            }
            Command::Edit(index) => {
                let Some(contact) = controller.view().contacts.get(index).cloned() else {
                    println!("no contact at position {}", index + 1);
                    continue;
                };
                let editor = ContactEditor::edit(Arc::clone(&gateway), contact.id);
                run_editor(editor, &mut lines, &controller).await?;
            }
            Command::Delete(index) => {
                let Some(contact) = controller.view().contacts.get(index).cloned() else {
                    println!("no contact at position {}", index + 1);
                    continue;
                };
                let answer = ask(&mut lines, &format!("delete \"{}\"? [y/N]", contact.name)).await?;
                if answer.eq_ignore_ascii_case("y") {
                    // Outcome is reported through the event stream.
                    let _ = controller.delete_contact(&contact).await;
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(message) => println!("{message}"),
        }
    }

    controller.unmount();
    renderer.abort();
    Ok(())
}

fn render(view: &ListView) {
    if !view.query.search_text.is_empty() {
        println!("results for \"{}\"", view.query.search_text);
    }
    let arrow = match view.query.sort {
        SortDirection::Ascending => "↑",
        SortDirection::Descending => "↓",
    };
    println!("name {arrow}");
    if view.shows_empty_state() {
        println!("  no contacts found");
    }
    for (position, contact) in view.contacts.iter().enumerate() {
        let category = contact
            .category_name
            .as_deref()
            .map(|name| format!(" [{name}]"))
            .unwrap_or_default();
        println!(
            "{:>3}. {}{category}  {}  {}",
            position + 1,
            contact.name,
            contact.email.as_deref().unwrap_or("-"),
            contact.phone
        );
    }
    if view.loading {
        println!("  loading...");
    }
}

async fn ask(lines: &mut InputLines, label: &str) -> Result<String> {
    print!("{label} ");
    io::stdout().flush()?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(answer.trim().to_string())
}

/// Empty input keeps the current value, `-` clears it.
async fn ask_field(lines: &mut InputLines, label: &str, current: &str) -> Result<String> {
    let answer = ask(lines, &format!("{label} [{current}]:")).await?;
    Ok(match answer.as_str() {
        "" => current.to_string(),
        "-" => String::new(),
        _ => answer,
    })
}

async fn run_editor(
    mut editor: ContactEditor,
    lines: &mut InputLines,
    controller: &ListController,
) -> Result<()> {
    if let Err(notice) = editor.load().await {
        println!("error: {notice}");
        return Ok(());
    }

    let current = editor.fields().clone();
    let name = ask_field(lines, "name", &current.name).await?;
    let email = ask_field(lines, "e-mail", &current.email).await?;
    let phone = ask_field(lines, "phone", &current.phone).await?;
    {
        let fields = editor.fields_mut();
        fields.name = name;
        fields.email = email;
        fields.phone = phone;
    }

    if !editor.categories().is_empty() {
        println!("  0. no category");
        for (position, category) in editor.categories().iter().enumerate() {
            println!("{:>3}. {}", position + 1, category.name);
        }
        let selected = editor
            .categories()
            .iter()
            .position(|category| Some(&category.id) == current.category_id.as_ref())
            .map_or(0, |position| position + 1);
        let choice = ask_field(lines, "category", &selected.to_string()).await?;
        let category_id = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| editor.categories().get(index))
            .map(|category| category.id.to_string())
            .unwrap_or_default();
        editor.select_category(&category_id);
    }

    match editor.submit().await {
        Ok(saved) => {
            println!("saved \"{}\"", saved.name);
            controller.refresh();
        }
        Err(notice) => println!("error: {notice}"),
    }
    Ok(())
}

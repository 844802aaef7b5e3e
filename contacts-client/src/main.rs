use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use contacts_client::api::{ContactsApi, DEFAULT_BASE_URL};
use contacts_client::app::ContactsApp;
use contacts_client::render;
use contacts_client::views::{ContactForm, ContactListView, FormField, FORM_FIELDS};
use shared_types::{UpdateContactRequest, DEFAULT_LIMIT, DEFAULT_PAGE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the contacts API", long_about = None)]
struct Args {
    /// Server root URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of contacts
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: i64,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: i64,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single contact
    Get { id: i64 },
    /// Create a contact
    Add(AddArgs),
    /// Change some fields of a contact
    Update {
        id: i64,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a contact
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Check that the server is up
    Health,
    /// Interactive list with search and paging
    Browse,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    job_title: Option<String>,
    #[arg(long)]
    favorite: bool,
}

#[derive(ClapArgs, Debug)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    job_title: Option<String>,
    #[arg(long)]
    favorite: Option<bool>,
}

impl From<UpdateArgs> for UpdateContactRequest {
    fn from(args: UpdateArgs) -> Self {
        UpdateContactRequest {
            name: args.name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            company: args.company,
            job_title: args.job_title,
            is_favorite: args.favorite,
        }
    }
}

type StdinLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let api = ContactsApi::new(args.base_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match args.command {
        Command::List {
            page,
            limit,
            search,
        } => {
            let response = api.list_contacts(page, limit, search.as_deref()).await?;
            println!("{}", render::contact_table(&response.data));
            println!(
                "\nPage {} of {} ({} total)",
                response.meta.page, response.meta.total_pages, response.meta.total
            );
        }
        Command::Get { id } => {
            let contact = api.get_contact(id).await?;
            println!("{}", render::contact_detail(&contact));
        }
        Command::Add(add) => {
            let mut form = ContactForm::new();
            form.name = add.name;
            form.email = add.email;
            form.phone = add.phone;
            form.address = add.address.unwrap_or_default();
            form.company = add.company.unwrap_or_default();
            form.job_title = add.job_title.unwrap_or_default();
            form.favorite = add.favorite;

            let Ok(request) = form.validate() else {
                bail!("Invalid contact:\n{}", render::form_errors(&form));
            };
            let contact = api.create_contact(&request).await?;
            println!("{}", render::contact_detail(&contact));
        }
        Command::Update { id, fields } => {
            let request = UpdateContactRequest::from(fields);
            if request.is_empty() {
                bail!("Nothing to update; pass at least one field flag");
            }
            request.validate().context("Invalid changes")?;
            let contact = api.update_contact(id, &request).await?;
            println!("{}", render::contact_detail(&contact));
        }
        Command::Delete { id, yes } => {
            if !yes {
                println!("{}", render::delete_prompt(id));
                if !confirmed(&mut lines).await? {
                    println!("Cancelled");
                    return Ok(());
                }
            }
            let response = api.delete_contact(id).await?;
            println!("{}", response.message);
        }
        Command::Health => {
            let health = api.health().await?;
            println!("{}: {}", health.status, health.message);
        }
        Command::Browse => browse(ContactsApp::new(api), &mut lines).await?,
    }

    Ok(())
}

async fn browse(mut app: ContactsApp, lines: &mut StdinLines) -> Result<()> {
    let mut dirty = true;

    loop {
        if app.refresh().await {
            dirty = true;
        }
        if dirty {
            print_screen(&mut app);
            dirty = false;
        }

        let deadline = app.list.search_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if !handle_line(&mut app, lines, line.trim_end()).await? {
                    return Ok(());
                }
                dirty = true;
            }
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(
                deadline.unwrap_or_else(Instant::now),
            )), if deadline.is_some() => {
                dirty = app.list.tick(Instant::now());
            }
        }
    }
}

/// Returns false when the user asked to quit.
async fn handle_line(app: &mut ContactsApp, lines: &mut StdinLines, line: &str) -> Result<bool> {
    match line.split_once(' ').unwrap_or((line, "")) {
        (":q", _) => return Ok(false),
        (":n", _) => {
            app.list.next_page();
        }
        (":p", _) => {
            app.list.previous_page();
        }
        (":a", _) => {
            app.form.reset();
            fill_form(&mut app.form, lines).await?;
            if app.submit_form().await.is_none() && !app.form.errors().is_empty() {
                println!("{}", render::form_errors(&app.form));
            }
        }
        (":d", id) => match id.trim().parse::<i64>() {
            Ok(id) => {
                app.request_delete(id);
                println!("{}", render::delete_prompt(id));
                if confirmed(lines).await? {
                    app.confirm_delete().await;
                } else {
                    app.cancel_delete();
                }
            }
            Err(_) => println!("Usage: :d <id>"),
        },
        _ => app.list.set_search_input(line, Instant::now()),
    }

    Ok(true)
}

async fn fill_form(form: &mut ContactForm, lines: &mut StdinLines) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    for field in FORM_FIELDS {
        let prompt = match field {
            FormField::Favorite => format!("{} [y/N]: ", field.label()),
            _ if field.is_required() => format!("{}*: ", field.label()),
            _ => format!("{}: ", field.label()),
        };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let value = lines.next_line().await?.unwrap_or_default();
        form.set(field, value.trim());
    }

    Ok(())
}

async fn confirmed(lines: &mut StdinLines) -> Result<bool> {
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_screen(app: &mut ContactsApp) {
    let view: &ContactListView = &app.list;
    println!("\n{}", render::list_screen(view));
    if let Some(notice) = app.take_notice() {
        println!("{}", render::notice(&notice));
    }
}

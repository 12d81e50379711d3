use adwolf_client::{ChatController, ERROR_MARKER};
use adwolf_core::Role;
use adwolf_protocol::StreamEvent;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Empty-state suggestions, mirroring the web app's suggested prompts.
const SUGGESTED_PROMPTS: [&str; 3] = [
    "Kampanyalarımı özetle",
    "Bu ay en çok harcayan kampanya hangisi?",
    "Google Ads performansım nasıl gidiyor?",
];

/// Runs the interactive chat loop until `/quit` or end of input.
pub async fn run(mut controller: ChatController) -> anyhow::Result<()> {
    println!("AdWolf Asistan — komutlar: /threads  /open <id>  /new  /delete <id>  /quit");
    if controller.session().messages().is_empty() {
        println!("Örnek sorular:");
        for prompt in SUGGESTED_PROMPTS {
            println!("  • {prompt}");
        }
    } else {
        render_transcript(&controller);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if let Some(cmd) = input.strip_prefix('/') {
            if !handle_command(&mut controller, cmd).await {
                break;
            }
        } else {
            send(&mut controller, input).await;
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

async fn send(controller: &mut ChatController, input: &str) {
    let mut saw_terminal = false;
    controller
        .send(input, |event| match event {
            StreamEvent::TextDelta { content } => {
                print!("{content}");
                let _ = std::io::stdout().flush();
            }
            StreamEvent::ToolCall { tool_name, .. } => {
                println!("[araç çalışıyor: {tool_name}]");
            }
            StreamEvent::Done { .. } => {
                saw_terminal = true;
                println!();
            }
            StreamEvent::Error { content } => {
                saw_terminal = true;
                println!(
                    "\n{ERROR_MARKER} {}",
                    content.as_deref().unwrap_or("Bir hata oluştu.")
                );
            }
            _ => {}
        })
        .await;

    if !saw_terminal {
        // Transport failure: the reducer committed a fallback error message
        // without any event reaching us. Show it.
        if let Some(last) = controller.session().messages().last() {
            if last.role == Role::Assistant && last.content.starts_with(ERROR_MARKER) {
                println!("{}", last.content);
            }
        }
    }
}

/// Handles a slash command. Returns `false` to exit the loop.
async fn handle_command(controller: &mut ChatController, cmd: &str) -> bool {
    let mut parts = cmd.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit") | Some("q"), _) => return false,

        (Some("threads"), _) => match controller.refresh_threads().await {
            Ok(()) => {
                if controller.threads().is_empty() {
                    println!("Henüz konuşma yok.");
                }
                for thread in controller.threads() {
                    println!(
                        "{}  {:>3} mesaj  {}",
                        thread.id, thread.message_count, thread.title
                    );
                }
            }
            Err(err) => println!("{ERROR_MARKER} Konuşmalar alınamadı: {err}"),
        },

        (Some("open"), Some(id)) => match controller.open_thread(id).await {
            Ok(()) => render_transcript(controller),
            Err(err) => println!("{ERROR_MARKER} Konuşma açılamadı: {err}"),
        },
        (Some("open"), None) => println!("Kullanım: /open <id>"),

        (Some("new"), _) => {
            controller.new_thread();
            println!("Yeni konuşma başlatıldı.");
        }

        (Some("delete"), Some(id)) => match controller.delete_thread(id).await {
            Ok(()) => println!("Konuşma silindi: {id}"),
            Err(err) => println!("{ERROR_MARKER} Konuşma silinemedi: {err}"),
        },
        (Some("delete"), None) => println!("Kullanım: /delete <id>"),

        _ => println!("Bilinmeyen komut: /{cmd}"),
    }
    true
}

fn render_transcript(controller: &ChatController) {
    for message in controller.session().messages() {
        match message.role {
            Role::User => println!("Siz: {}", message.content),
            Role::Assistant => println!("Asistan: {}", message.content),
            Role::System => {}
        }
    }
}

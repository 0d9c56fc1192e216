/// Story Editor — interactive shell for authoring gamebook stories.
///
/// Usage: story_editor [story.json]
///
/// Commands:
///   list                        — list scenes with a preview
///   new                         — add a placeholder scene and open it
///   edit <id>                   — open a scene in the form
///   show                        — print the open form
///   id <id>                     — change the form's scene id (renames on save)
///   text <text>                 — set the text (`\n` for line breaks)
///   next <id>                   — switch to linear mode with this target
///   choice <id> <text>          — switch to choice mode and append a choice
///   effect <start> <end> <type> — append an effect range
///   clear choices|effects       — empty the choice or effect rows
///   save                        — validate the form and store the scene
///   delete                      — delete the open scene
///   check                       — report effect ranges that render oddly
///   import <path>               — replace the story with a JSON file
///   export [path]               — write the story (default: story.json)
///   help                        — list commands
///   quit                        — exit

use gamebook_engine::core::editor::{
    ChoiceDraft, EditorError, EffectDraft, SceneDraft, StoryEditor, TransitionDraft,
    EXPORT_FILE_NAME,
};
use gamebook_engine::schema::effect::EffectKind;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_help();
        return;
    }

    let mut editor = StoryEditor::new();
    if let Some(path) = args.get(1) {
        import_file(&mut editor, path);
    }

    println!("Loaded {} scenes", editor.graph().len());
    println!("Type 'help' for commands.\n");

    let mut draft: Option<SceneDraft> = None;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        match draft {
            Some(ref d) => print!("editor [{}]> ", d.id),
            None => print!("editor> "),
        }
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "list" | "ls" => {
                for row in editor.scene_list() {
                    let marker = if editor.selected() == Some(row.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {:<20} {}...", marker, row.id, row.preview);
                }
            }
            "new" => {
                let d = editor.add_scene();
                println!("Added scene '{}'", d.id);
                draft = Some(d);
            }
            "edit" => match editor.select(rest) {
                Ok(d) => {
                    print_draft(&d);
                    draft = Some(d);
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "show" => match draft {
                Some(ref d) => print_draft(d),
                None => println!("No scene open. Use 'edit <id>' or 'new'."),
            },
            "save" => match draft {
                Some(ref mut d) => match editor.save_scene(d) {
                    Ok(id) => {
                        d.id = id.clone();
                        println!("Saved scene '{}'", id);
                    }
                    Err(e) => println!("ERROR: {}", e),
                },
                None => println!("No scene open."),
            },
            "delete" => match editor.delete_current() {
                Ok(_) => {
                    println!("Deleted scene '{}'", draft.as_ref().map_or("", |d| d.id.as_str()));
                    draft = None;
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "check" => {
                let issues = editor.effect_issues();
                if issues.is_empty() {
                    println!("All effect ranges are in order.");
                }
                for (id, issue) in issues {
                    println!("WARNING: scene '{}': {}", id, issue);
                }
            }
            "import" => {
                if rest.is_empty() {
                    println!("Usage: import <path>");
                } else if import_file(&mut editor, rest) {
                    draft = None;
                }
            }
            "export" => {
                let path = if rest.is_empty() { EXPORT_FILE_NAME } else { rest };
                match editor.graph().save_to_json(Path::new(path)) {
                    Ok(()) => println!("Wrote {} scenes to '{}'", editor.graph().len(), path),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            field => match draft {
                Some(ref mut d) => edit_field(d, field, rest),
                None => println!("Unknown command '{}' (or no scene open). Type 'help'.", field),
            },
        }
    }
}

/// Apply a form-editing command to the open draft.
fn edit_field(draft: &mut SceneDraft, field: &str, rest: &str) {
    match field {
        "id" => draft.id = rest.to_string(),
        "text" => draft.text = rest.replace("\\n", "\n"),
        "next" => draft.transition = TransitionDraft::Next(rest.to_string()),
        "choice" => {
            let (next, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let choice = ChoiceDraft {
                text: text.trim().to_string(),
                next: next.to_string(),
            };
            match draft.transition {
                TransitionDraft::Choices(ref mut choices) => choices.push(choice),
                TransitionDraft::Next(_) => {
                    draft.transition = TransitionDraft::Choices(vec![choice]);
                }
            }
        }
        "effect" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            if parts.len() != 3 {
                println!("Usage: effect <start> <end> <large|small|shake|emphasis>");
                return;
            }
            draft.effects.push(EffectDraft {
                start: parts[0].to_string(),
                end: parts[1].to_string(),
                kind: EffectKind::from(parts[2]),
            });
        }
        "clear" => match rest {
            "choices" => draft.transition = TransitionDraft::Choices(Vec::new()),
            "effects" => draft.effects.clear(),
            _ => println!("Usage: clear choices|effects"),
        },
        other => {
            println!("Unknown command '{}'. Type 'help'.", other);
            return;
        }
    }
    println!("(unsaved) use 'save' to store the scene");
}

fn import_file(editor: &mut StoryEditor, path: &str) -> bool {
    let result = std::fs::read(Path::new(path))
        .map_err(|e| EditorError::Story(e.into()))
        .and_then(|bytes| editor.import(&bytes));
    match result {
        Ok(count) => {
            println!("Loaded {} scenes from '{}'", count, path);
            true
        }
        Err(e) => {
            eprintln!("ERROR: Failed to load '{}': {}", path, e);
            false
        }
    }
}

fn print_draft(draft: &SceneDraft) {
    println!("id:   {}", draft.id);
    println!("text: {}", draft.text.replace('\n', "\\n"));
    match &draft.transition {
        TransitionDraft::Next(next) if next.is_empty() => println!("next: (ending)"),
        TransitionDraft::Next(next) => println!("next: {}", next),
        TransitionDraft::Choices(choices) => {
            for (i, choice) in choices.iter().enumerate() {
                println!("  {}) {} -> {}", i + 1, choice.text, choice.next);
            }
        }
    }
    let kinds: Vec<String> = EffectKind::builtin().iter().map(|k| k.to_string()).collect();
    for effect in &draft.effects {
        println!("effect: {}..{} {}", effect.start, effect.end, effect.kind);
    }
    if draft.effects.is_empty() {
        println!("effects: none (kinds: {})", kinds.join(", "));
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list                        — list scenes with a preview");
    println!("  new                         — add a placeholder scene and open it");
    println!("  edit <id>                   — open a scene in the form");
    println!("  show                        — print the open form");
    println!("  id <id>                     — change the form's scene id (renames on save)");
    println!("  text <text>                 — set the text (\\n for line breaks)");
    println!("  next <id>                   — switch to linear mode with this target");
    println!("  choice <id> <text>          — switch to choice mode and append a choice");
    println!("  effect <start> <end> <type> — append an effect range");
    println!("  clear choices|effects       — empty the choice or effect rows");
    println!("  save                        — validate the form and store the scene");
    println!("  delete                      — delete the open scene");
    println!("  check                       — report effect ranges that render oddly");
    println!("  import <path>               — replace the story with a JSON file");
    println!("  export [path]               — write the story (default: story.json)");
    println!("  quit                        — exit");
}

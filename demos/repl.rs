use std::{
    env,
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use typeahead::stats::spawn_stats_poll;
use typeahead::{
    AssistConfig, Assistant, Dictionary, HttpService, NavKey, SpellCorrector, SuggestedCorrection,
    SuggestionKind,
};

const HELP: &str = "\
  <text>          type text at the end of the document
  :back           delete the last character
  :k N            set the rank limit
  :next / :prev   move the highlight
  :accept         commit the highlighted suggestion
  :pick N         commit suggestion N (1-based)
  :insert WORD    add a word to the service
  :delete WORD    remove a word from the service
  :grammar        toggle grammar annotation
  :trie           print the trie view as SVG
  :stats          show the latest service statistics
  :check          spell check every word in the document
  :clear          empty the document
  :q              quit";

// how long a prompt waits for answers before printing what it has
const SETTLE_WAIT: Duration = Duration::from_millis(500);

fn print_state(assistant: &Assistant<HttpService>) {
    println!("  | {}", assistant.document().text());
    let state = assistant.suggestions();
    for (i, item) in state.items().iter().enumerate() {
        let marker = if state.active_index() == Some(i) { '>' } else { ' ' };
        let tag = match item.kind {
            SuggestionKind::Completion => "",
            SuggestionKind::Spelling => "  (spelling)",
        };
        println!("  {marker} {}. {}{tag}", i + 1, item.text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "typeahead.toml".into());
    let config = AssistConfig::load_or_default(&config_path);

    let service = Arc::new(match config.service.request_timeout() {
        Some(timeout) => HttpService::with_timeout(config.service.base_url.clone(), timeout)?,
        None => HttpService::new(config.service.base_url.clone())?,
    });
    let mut assistant = Assistant::new(Arc::clone(&service), &config.suggest);

    // spelling candidates show up once the word list has loaded
    let mut dictionary_load = config
        .dictionary
        .path
        .clone()
        .map(|path| tokio::spawn(async move { Dictionary::load(path).await }));
    let mut corrector: Option<Arc<SpellCorrector>> = None;

    let stats = config
        .service
        .stats_interval()
        .map(|interval| spawn_stats_poll(Arc::clone(&service), interval));

    println!(
        "typeahead REPL - service: {}\n:help for commands, :q to quit",
        service.base_url()
    );
    assistant.refresh_trie();

    let mut input = String::new();
    loop {
        if dictionary_load.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = dictionary_load.take() {
                match task.await? {
                    Ok(dictionary) => {
                        let loaded = Arc::new(SpellCorrector::new(dictionary));
                        assistant.attach_dictionary(Arc::clone(&loaded));
                        corrector = Some(loaded);
                    }
                    Err(e) => log::warn!("Spell checking disabled: {e}"),
                }
            }
        }

        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let line = input.trim_end_matches(['\n', '\r']);
        let (command, arg) = match line.split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            ":q" => break,
            ":help" => println!("{HELP}"),
            ":back" => assistant.backspace(),
            ":k" => match arg.parse() {
                Ok(k) => assistant.set_limit(k),
                Err(_) => println!("  expected a number"),
            },
            ":next" => {
                assistant.on_key(NavKey::Next);
            }
            ":prev" => {
                assistant.on_key(NavKey::Previous);
            }
            ":accept" => {
                assistant.on_key(NavKey::Accept);
            }
            ":pick" => {
                let word = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| assistant.suggestions().items().get(n.wrapping_sub(1)))
                    .map(|item| item.text.clone());
                match word {
                    Some(word) => {
                        assistant.select(&word);
                    }
                    None => println!("  no such suggestion"),
                }
            }
            ":insert" if !arg.is_empty() => assistant.insert_word(arg),
            ":delete" if !arg.is_empty() => assistant.delete_word(arg),
            ":grammar" => {
                if assistant.toggle_grammar() {
                    if let Some(annotated) = assistant.annotated() {
                        for mark in annotated.marks() {
                            println!(
                                "  {:?} {:?}: {}",
                                mark.range,
                                &annotated.plain_text()[mark.range.clone()],
                                mark.kind.reason()
                            );
                        }
                        println!("  {}", annotated.to_html());
                    }
                } else {
                    println!("  annotation off");
                }
            }
            ":trie" => print!("{}", assistant.trie_layout().to_svg()),
            ":stats" => match &stats {
                Some((_, rx)) => {
                    for entry in rx.borrow().iter() {
                        println!("  {} = {}", entry.key, entry.value);
                    }
                }
                None => println!("  statistics polling is disabled"),
            },
            ":check" => match &corrector {
                Some(corrector) => {
                    let words: Vec<String> = assistant
                        .document()
                        .text()
                        .split_whitespace()
                        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                        .filter(|w| !w.is_empty())
                        .collect();
                    let results = corrector.suggest_word_corrections(&words, config.suggest.spell_limit);
                    for (word, result) in words.iter().zip(results) {
                        if let SuggestedCorrection::Suggestions(list) = result {
                            println!("  {}  ->  {}", word, list.join(", "));
                        }
                    }
                }
                None => println!("  no dictionary loaded"),
            },
            ":clear" => assistant.set_text(""),
            _ if line.starts_with(':') => println!("  unknown command, :help lists them"),
            _ => assistant.type_text(line),
        }
        if tokio::time::timeout(SETTLE_WAIT, assistant.settle()).await.is_err() {
            println!("  ({} requests still pending)", assistant.in_flight());
        }
        print_state(&assistant);
    }

    if let Some((handle, _)) = stats {
        handle.abort();
    }
    Ok(())
}

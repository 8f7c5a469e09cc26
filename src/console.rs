//! Line-based front end: one command per line on the input, results on the output.

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use crate::address::IdSource;
use crate::book::AddressBookStore;
use crate::export::save_records;
use crate::geocode::AddressLookup;
use crate::storage::Storage;
use crate::workflow::{CompositionWorkflow, SearchCompletion};

const HELP: &str = "\
commandes:
  search <rue>|<code postal>   trouver une adresse
  select <id ou numéro>        choisir une adresse trouvée
  person <prénom>|<nom>        ajouter au carnet d'adresses
  candidates                   afficher les adresses trouvées
  list                         afficher le carnet d'adresses
  remove <id>                  supprimer du carnet
  export <fichier.csv>         exporter le carnet
  reset                        réinitialiser tous les champs
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search { street_name: String, zip_code: String },
    Select(String),
    Person { first_name: String, last_name: String },
    Candidates,
    List,
    Remove(String),
    Export(String),
    Reset,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match verb {
            "search" => {
                let (street_name, zip_code) = pair(rest).ok_or("usage: search <rue>|<code postal>")?;
                Ok(Command::Search { street_name, zip_code })
            }
            "select" => argument(rest, "usage: select <id>").map(Command::Select),
            "person" => {
                let (first_name, last_name) = pair(rest).ok_or("usage: person <prénom>|<nom>")?;
                Ok(Command::Person { first_name, last_name })
            }
            "candidates" => Ok(Command::Candidates),
            "list" => Ok(Command::List),
            "remove" => argument(rest, "usage: remove <id>").map(Command::Remove),
            "export" => argument(rest, "usage: export <fichier.csv>").map(Command::Export),
            "reset" => Ok(Command::Reset),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("commande inconnue [{}], tapez `help`", other)),
        }
    }
}

fn pair(rest: &str) -> Option<(String, String)> {
    let (a, b) = rest.split_once('|')?;
    Some((a.trim().to_string(), b.trim().to_string()))
}

fn argument(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(usage.to_string())
    } else {
        Ok(rest.to_string())
    }
}

/// Drives a workflow and an address book from text commands
pub struct Console<'a, L, I, S> {
    workflow: &'a mut CompositionWorkflow<L, I>,
    book: &'a mut AddressBookStore<S>,
}

impl<'a, L: AddressLookup, I: IdSource, S: Storage> Console<'a, L, I, S> {
    pub fn new(workflow: &'a mut CompositionWorkflow<L, I>, book: &'a mut AddressBookStore<S>) -> Self {
        Self {
            workflow,
            book,
        }
    }

    /// read commands until `quit` or end of input
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> color_eyre::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(format!("{}\n", HELP).as_bytes()).await?;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    debug!("running {:?}", command);
                    self.execute(command).await
                }
                Err(usage) => usage,
            };
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok(())
    }

    /// run one command, returning the text to show
    pub async fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Search { street_name, zip_code } => {
                match self.workflow.submit_search(&street_name, &zip_code).await {
                    Ok(SearchCompletion::Added(address)) => format!("trouvée: {}\n{}", address, self.render_candidates()),
                    Ok(SearchCompletion::Stale) => String::new(),
                    Err(e) => format!("! {}", e),
                }
            }
            Command::Select(choice) => {
                let id = self.resolve_candidate(&choice);
                match self.workflow.select_candidate(&id) {
                    Ok(()) => format!("adresse [{}] sélectionnée", id),
                    Err(e) => format!("! {}", e),
                }
            }
            Command::Person { first_name, last_name } => {
                match self.workflow.submit_person(self.book, &first_name, &last_name).await {
                    Ok(record) => format!("{} ajouté(e) au carnet d'adresses", record.full_name()),
                    Err(e) => format!("! {}", e),
                }
            }
            Command::Candidates => self.render_candidates(),
            Command::List => self.render_book(),
            Command::Remove(id) => {
                match self.workflow.remove_from_book(self.book, &id).await {
                    Ok(Some(record)) => format!("{} supprimé(e)", record.full_name()),
                    Ok(None) => format!("aucune entrée [{}] dans le carnet", id),
                    Err(e) => format!("! {}", e),
                }
            }
            Command::Export(path) => match save_records(self.book.all(), &path) {
                Ok(()) => format!("[{}] entrée(s) exportée(s) vers [{}]", self.book.len(), path),
                Err(e) => format!("! export impossible: {}", e),
            },
            Command::Reset => {
                self.workflow.reset_form();
                "champs réinitialisés".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    /// a 1-based position in the candidate list also names a candidate
    fn resolve_candidate(&self, choice: &str) -> String {
        choice.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| self.workflow.candidates().nth(idx))
            .map(|address| address.id.clone())
            .unwrap_or_else(|| choice.to_string())
    }

    fn render_candidates(&self) -> String {
        let lines = self.workflow.candidates()
            .enumerate()
            .map(|(idx, address)| format!("  [{}] {}  {}", idx + 1, address.id, address))
            .collect::<Vec<_>>();
        if lines.is_empty() {
            "aucune adresse trouvée".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn render_book(&self) -> String {
        let mut out = format!("Carnet d'adresses ({})", self.book.len());
        if self.book.is_loading() {
            return out;
        }
        if self.book.is_empty() {
            out.push_str("\nAucune adresse trouvée, veuillez réessayer 😉");
        }
        for record in self.book.all() {
            out.push_str(&format!("\n  {}  {}, {}", record.id, record.full_name(), record.address()));
        }
        out
    }
}

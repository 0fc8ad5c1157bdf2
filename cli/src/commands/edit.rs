use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};
use std::path::Path;

use mangia_core::export::{
    daily_analysis_filename, daily_analysis_text, period_report_filename, period_report_text,
};
use mangia_core::gateway::PeriodReport;
use mangia_core::models::{DailyEntry, NutrientAnalysis, PeriodAnalysis};
use mangia_core::period::Granularity;
use mangia_core::service::DiaryService;
use mangia_core::session::{Action, Outcome, Session, ViewMode, confirmation_message};

use crate::config::Config;
use crate::gemini::GeminiClient;

use super::helpers::{confirm, parse_date, write_artifact};

const EDITS_DAILY_ONLY: &str = "Le modifiche sono disponibili solo nella vista giornaliera.";
const GENERATING: &str = "Generazione dell'analisi in corso...";

pub(crate) fn cmd_edit(service: &DiaryService, date: Option<String>) -> Result<()> {
    let date = parse_date(date)?;
    let mut editor = Editor::new(service, date)?;

    eprintln!("Editor interattivo del diario. Digita 'aiuto' per l'elenco dei comandi.");
    editor.render_daily();

    let stdin = io::stdin();
    loop {
        eprint!("> ");
        io::stderr().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        if editor.handle(line.trim())? == LoopControl::Quit {
            break;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

struct Editor<'a> {
    service: &'a DiaryService,
    session: Session,
    /// Working copy of the entry shown in the daily view. Diverges from the
    /// stored record until `salva`.
    entry: DailyEntry,
    gemini: Option<GeminiClient>,
    analysis: Option<NutrientAnalysis>,
    report: Option<(Granularity, PeriodAnalysis)>,
}

impl<'a> Editor<'a> {
    fn new(service: &'a DiaryService, date: NaiveDate) -> Result<Self> {
        Ok(Self {
            service,
            session: Session::new(date),
            entry: service.entry_or_blank(&date.to_string())?,
            gemini: None,
            analysis: None,
            report: None,
        })
    }

    fn handle(&mut self, input: &str) -> Result<LoopControl> {
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "" => {}
            "p" | "pasti" => self.set_meals(rest),
            "a" | "attivita" | "attività" => self.set_activity(rest),
            "g" => self.toggle_day_off(),
            "salva" => self.save()?,
            "analizza" => self.analyze()?,
            "data" => {
                if rest.is_empty() {
                    eprintln!("Uso: data <YYYY-MM-DD|today|yesterday|tomorrow>");
                } else {
                    match parse_date(Some(rest.to_string())) {
                        Ok(date) => {
                            self.apply(Action::GoTo(date))?;
                        }
                        Err(e) => eprintln!("{e}"),
                    }
                }
            }
            "vista" => {
                if rest.is_empty() {
                    eprintln!("Uso: vista <daily|weekly|monthly|annual>");
                } else {
                    match ViewMode::parse(rest) {
                        Ok(view) => {
                            self.apply(Action::Switch(view))?;
                        }
                        Err(e) => eprintln!("{e}"),
                    }
                }
            }
            "esporta" => self.export()?,
            "aiuto" | "?" => print_help(),
            "esci" | "q" => {
                if self.apply(Action::Quit)? == Outcome::Quit {
                    return Ok(LoopControl::Quit);
                }
            }
            other => {
                eprintln!("Comando sconosciuto: '{other}'. Digita 'aiuto' per l'elenco dei comandi.");
            }
        }
        Ok(LoopControl::Continue)
    }

    // --- Daily edits ---

    fn set_meals(&mut self, text: &str) {
        if self.session.view() != ViewMode::Daily {
            eprintln!("{EDITS_DAILY_ONLY}");
            return;
        }
        if text.is_empty() {
            eprintln!("Uso: p <testo>");
            return;
        }
        self.entry.meals = text.to_string();
        self.session.update(Action::MarkDirty);
        self.render_daily();
    }

    fn set_activity(&mut self, text: &str) {
        if self.session.view() != ViewMode::Daily {
            eprintln!("{EDITS_DAILY_ONLY}");
            return;
        }
        if text.is_empty() {
            eprintln!("Uso: a <testo>");
            return;
        }
        self.entry.activity = text.to_string();
        self.session.update(Action::MarkDirty);
        self.render_daily();
    }

    fn toggle_day_off(&mut self) {
        if self.session.view() != ViewMode::Daily {
            eprintln!("{EDITS_DAILY_ONLY}");
            return;
        }
        self.entry.is_non_working_day = !self.entry.is_non_working_day;
        self.session.update(Action::MarkDirty);
        self.render_daily();
    }

    fn save(&mut self) -> Result<()> {
        if self.session.view() != ViewMode::Daily {
            eprintln!("{EDITS_DAILY_ONLY}");
            return Ok(());
        }
        self.entry = self.service.save_entry(&self.entry)?;
        self.session.update(Action::Saved);
        println!("Voce salvata.");
        Ok(())
    }

    /// Persist the entry first, then ask the model about it. Failures are
    /// shown inline and leave the editor running.
    fn analyze(&mut self) -> Result<()> {
        if self.session.view() != ViewMode::Daily {
            eprintln!("{EDITS_DAILY_ONLY}");
            return Ok(());
        }
        self.save()?;
        eprintln!("{GENERATING}");

        let service = self.service;
        let date = self.session.date();
        let provider = match self.provider() {
            Ok(provider) => provider,
            Err(e) => {
                eprintln!("{e}");
                return Ok(());
            }
        };
        match service.analyze_day(provider, &date.to_string()) {
            Ok(analysis) => {
                println!("{}", daily_analysis_text(date, &analysis));
                self.analysis = Some(analysis);
            }
            Err(e) => eprintln!("{e}"),
        }
        Ok(())
    }

    // --- Navigation ---

    /// Route an action through the session, asking for confirmation when it
    /// would discard unsaved changes.
    fn apply(&mut self, action: Action) -> Result<Outcome> {
        let outcome = match self.session.update(action) {
            Outcome::NeedsConfirmation => {
                if confirm(confirmation_message(&action))? {
                    self.session.force(action)
                } else {
                    return Ok(Outcome::NeedsConfirmation);
                }
            }
            outcome => outcome,
        };

        if outcome == Outcome::Applied && matches!(action, Action::GoTo(_) | Action::Switch(_)) {
            self.refresh()?;
        }
        Ok(outcome)
    }

    /// Reload state after navigation. Analyses belong to the view they were
    /// generated in and are dropped here.
    fn refresh(&mut self) -> Result<()> {
        self.analysis = None;
        self.report = None;
        self.entry = self
            .service
            .entry_or_blank(&self.session.date().to_string())?;

        match self.session.view().granularity() {
            None => self.render_daily(),
            Some(granularity) => {
                if let Err(e) = self.render_period(granularity) {
                    eprintln!("{e}");
                }
            }
        }
        Ok(())
    }

    fn render_period(&mut self, granularity: Granularity) -> Result<()> {
        eprintln!("{GENERATING}");
        let service = self.service;
        let reference = self.session.date();
        let provider = self.provider()?;
        match service.period_report(provider, reference, granularity)? {
            PeriodReport::NoData(message) => println!("{message}"),
            PeriodReport::Analysis(analysis) => {
                println!("{}", period_report_text(&analysis, granularity, reference));
                self.report = Some((granularity, analysis));
            }
        }
        Ok(())
    }

    // --- Output ---

    fn export(&mut self) -> Result<()> {
        let reference = self.session.date();
        let artifact = match self.session.view().granularity() {
            None => self.analysis.as_ref().map(|analysis| {
                (
                    daily_analysis_filename(reference),
                    daily_analysis_text(reference, analysis),
                )
            }),
            Some(_) => self.report.as_ref().map(|(granularity, analysis)| {
                (
                    period_report_filename(*granularity, reference),
                    period_report_text(analysis, *granularity, reference),
                )
            }),
        };

        let Some((filename, text)) = artifact else {
            eprintln!("Nessuna analisi da esportare.");
            return Ok(());
        };
        let path = write_artifact(Path::new("."), &filename, text.as_bytes())?;
        println!("Salvato: {}", path.display());
        Ok(())
    }

    fn render_daily(&self) {
        let entry = &self.entry;
        println!();
        println!(
            "== Diario: {} (vista {}) ==",
            entry.date,
            self.session.view().label()
        );
        println!("Pasti: {}", display_or_dash(&entry.meals));
        println!("Attività fisica: {}", display_or_dash(&entry.activity));
        println!(
            "Giornata non lavorativa: {}",
            if entry.is_non_working_day { "Sì" } else { "No" }
        );
        if self.session.is_dirty() {
            println!("* modifiche non salvate");
        }
    }

    fn provider(&mut self) -> Result<&GeminiClient> {
        if self.gemini.is_none() {
            self.gemini = Some(GeminiClient::new(Config::gemini_api_key()?));
        }
        self.gemini.as_ref().context("Gemini client not initialized")
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn print_help() {
    eprintln!("Comandi:");
    eprintln!("  p <testo>      descrizione dei pasti");
    eprintln!("  a <testo>      attività fisica");
    eprintln!("  g              alterna giornata non lavorativa");
    eprintln!("  salva          salva la voce corrente");
    eprintln!("  analizza       salva e genera l'analisi nutrizionale");
    eprintln!("  data <data>    passa a un'altra data (YYYY-MM-DD, today, yesterday, tomorrow)");
    eprintln!("  vista <vista>  cambia vista: daily, weekly, monthly, annual");
    eprintln!("  esporta        salva l'ultima analisi come file di testo");
    eprintln!("  aiuto          questo elenco");
    eprintln!("  esci           esci dall'editor");
}

//! Diary exports: CSV, paginated PDF, and the plain-text analysis files.
//!
//! Column headers, filenames and the text layouts are product copy and
//! stay Italian. Callers pass already-filtered, date-sorted entries.

use anyhow::{Context, Result, anyhow};
use chrono::{Locale, NaiveDate};
use csv::{Terminator, WriterBuilder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::models::{
    DailyEntry, Gender, Goal, Lifestyle, NutrientAnalysis, PeriodAnalysis, UserProfile,
    format_quantity,
};
use crate::period::{Granularity, report_title};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

const CSV_HEADERS: [&str; 10] = [
    "data",
    "pasti",
    "attività",
    "giorno non lavorativo",
    "calorie",
    "proteine (g)",
    "carboidrati (g)",
    "grassi (g)",
    "riepilogo AI",
    "micronutrienti",
];

// --- Filenames ---

#[must_use]
pub fn csv_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!("diario_alimentare_{start}_{end}.csv")
}

#[must_use]
pub fn pdf_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!("diario_alimentare_{start}_{end}.pdf")
}

#[must_use]
pub fn daily_analysis_filename(date: NaiveDate) -> String {
    format!("analisi_giornaliera_{date}.txt")
}

#[must_use]
pub fn period_report_filename(granularity: Granularity, reference: NaiveDate) -> String {
    format!("analisi_{}_{reference}.txt", granularity.label())
}

// --- CSV ---

/// CSV rendering of the entries, UTF-8 with BOM and CRLF records. Analysis
/// columns are left empty for entries without an attached analysis.
pub fn entries_csv(entries: &[DailyEntry]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for entry in entries {
        let analysis = entry.analysis.as_ref();
        writer.write_record([
            entry.date.clone(),
            entry.meals.clone(),
            entry.activity.clone(),
            if entry.is_non_working_day { "Sì" } else { "No" }.to_string(),
            analysis.map_or_else(String::new, |a| format!("{:.0}", a.calories)),
            analysis.map_or_else(String::new, |a| format!("{:.1}", a.protein)),
            analysis.map_or_else(String::new, |a| format!("{:.1}", a.carbs)),
            analysis.map_or_else(String::new, |a| format!("{:.1}", a.fats)),
            analysis.map_or_else(String::new, |a| a.summary.clone()),
            analysis
                .and_then(|a| a.micronutrients.as_ref())
                .map_or_else(String::new, |m| m.join("; ")),
        ])?;
    }

    let body = writer
        .into_inner()
        .context("Failed to flush CSV buffer")?;
    let mut out = Vec::with_capacity(UTF8_BOM.len() + body.len());
    out.extend_from_slice(UTF8_BOM);
    out.extend_from_slice(&body);
    Ok(out)
}

// --- Plain-text analysis exports ---

/// The daily analysis as saved to `analisi_giornaliera_<date>.txt`.
#[must_use]
pub fn daily_analysis_text(date: NaiveDate, analysis: &NutrientAnalysis) -> String {
    let micronutrients = analysis
        .micronutrients
        .as_ref()
        .filter(|m| !m.is_empty())
        .map_or_else(|| "Nessun dato specifico.".to_string(), |m| m.join(", "));

    format!(
        "Analisi Nutrizionale del {date}\n\
         =====================================================\n\n\
         Riepilogo AI:\n\
         -------------\n\
         {summary}\n\n\
         Dati Macronutrienti:\n\
         ---------------------\n\
         - Calorie: {calories:.0} kcal\n\
         - Proteine: {protein:.1} g\n\
         - Carboidrati: {carbs:.1} g\n\
         - Grassi: {fats:.1} g\n\n\
         Micronutrienti Chiave:\n\
         ----------------------\n\
         {micronutrients}",
        date = date.format("%d/%m/%Y"),
        summary = analysis.summary,
        calories = analysis.calories,
        protein = analysis.protein,
        carbs = analysis.carbs,
        fats = analysis.fats,
    )
}

/// The period report as saved to `analisi_<periodo>_<date>.txt`.
#[must_use]
pub fn period_report_text(
    analysis: &PeriodAnalysis,
    granularity: Granularity,
    reference: NaiveDate,
) -> String {
    let micronutrients = analysis.micronutrients_analysis.as_ref().map_or_else(
        String::new,
        |text| {
            format!("\n\nBilancio dei Micronutrienti:\n----------------------------\n{text}")
        },
    );

    format!(
        "{title}\n\
         =====================================================\n\n\
         {summary}\n\n\
         Punti di forza:\n\
         ---------------\n\
         {strengths}\n\n\
         Aree di miglioramento:\n\
         ----------------------\n\
         {improvements}\n\n\
         Suggerimenti:\n\
         -------------\n\
         {suggestions}\n\n\
         {encouragement}{micronutrients}",
        title = report_title(reference, granularity),
        summary = analysis.summary,
        strengths = analysis.strengths,
        improvements = analysis.improvements,
        suggestions = analysis.suggestions,
        encouragement = analysis.encouragement,
    )
}

// --- PDF ---

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 14.0;
// An entry block never starts below this offset; it opens a new page.
const ENTRY_BREAK_MM: f64 = 200.0;
// Individual lines overflow to a new page past this offset.
const BOTTOM_LIMIT_MM: f64 = 275.0;
const WRAP_COLUMNS: usize = 95;

const MACRO_COLUMNS_MM: [f64; 4] = [14.0, 62.0, 106.0, 152.0];
const MACRO_HEADERS: [&str; 4] = [
    "Calorie (kcal)",
    "Proteine (g)",
    "Carboidrati (g)",
    "Grassi (g)",
];

/// Top-down cursor over a printpdf document (printpdf's origin is the
/// bottom-left corner, the layout below thinks in offsets from the top).
struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load PDF font: {e}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Failed to load PDF font: {e}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        layer.set_outline_thickness(0.3);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: 0.0,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layer.set_outline_thickness(0.3);
        self.y = 20.0;
    }

    fn ensure_room(&mut self) {
        if self.y > BOTTOM_LIMIT_MM {
            self.new_page();
        }
    }

    fn write_at(&self, text: &str, size: f64, x: f64, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT_MM - self.y), font);
    }

    fn line(&mut self, text: &str, size: f64, bold: bool, leading: f64) {
        self.ensure_room();
        self.write_at(text, size, MARGIN_MM, bold);
        self.y += leading;
    }

    fn wrapped(&mut self, text: &str, size: f64, leading: f64) {
        for row in wrap_text(text, WRAP_COLUMNS) {
            self.line(&row, size, false, leading);
        }
    }

    fn two_columns(&mut self, left: &str, right: &str, bold: bool, leading: f64) {
        self.ensure_room();
        self.write_at(left, 10.0, MARGIN_MM, bold);
        self.write_at(right, 10.0, 70.0, bold);
        self.y += leading;
    }

    fn macro_row(&mut self, cells: [&str; 4], bold: bool, leading: f64) {
        self.ensure_room();
        for (cell, x) in cells.iter().zip(MACRO_COLUMNS_MM) {
            self.write_at(cell, 10.0, x, bold);
        }
        self.y += leading;
    }

    fn rule(&mut self) {
        let y = Mm(PAGE_HEIGHT_MM - self.y);
        self.layer.add_shape(Line {
            points: vec![
                (Point::new(Mm(MARGIN_MM), y), false),
                (Point::new(Mm(PAGE_WIDTH_MM - MARGIN_MM), y), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
        self.y += 3.0;
    }

    fn set_gray(&self, gray: bool) {
        let shade = if gray { 0.4 } else { 0.0 };
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(shade, shade, shade, None)));
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow!("Failed to render PDF: {e}"))
    }
}

/// Greedy word wrap at `max` columns; embedded newlines start new rows and
/// overlong words are split hard.
fn wrap_text(text: &str, max: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for paragraph in text.split('\n') {
        let mut row = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if row.is_empty() {
                word.chars().count()
            } else {
                row.chars().count() + 1 + word.chars().count()
            };
            if needed > max && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            if word.chars().count() > max {
                let mut chunk = String::new();
                for c in word.chars() {
                    if chunk.chars().count() == max {
                        rows.push(std::mem::take(&mut chunk));
                    }
                    chunk.push(c);
                }
                row = chunk;
            } else {
                if !row.is_empty() {
                    row.push(' ');
                }
                row.push_str(word);
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

fn long_date_it(date: NaiveDate) -> String {
    date.format_localized("%A %-d %B %Y", Locale::it_IT)
        .to_string()
}

fn profile_rows(profile: &UserProfile) -> [(&'static str, String); 7] {
    let absent = || "N/D".to_string();
    [
        (
            "Età",
            profile.age.map_or_else(absent, |a| a.to_string()),
        ),
        (
            "Sesso",
            profile
                .gender
                .map_or_else(absent, |g| Gender::label(g).to_string()),
        ),
        (
            "Altezza (cm)",
            profile.height.map_or_else(absent, format_quantity),
        ),
        (
            "Peso (kg)",
            profile.weight.map_or_else(absent, format_quantity),
        ),
        (
            "Stile di Vita",
            profile
                .lifestyle
                .map_or_else(absent, |l| Lifestyle::label(l).to_string()),
        ),
        (
            "Obiettivo",
            profile
                .goal
                .map_or_else(absent, |g| Goal::label(g).to_string()),
        ),
        (
            "Condizioni/Dieta",
            profile
                .conditions
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .map_or_else(|| "Nessuna".to_string(), ToString::to_string),
        ),
    ]
}

fn render_pdf_entry(writer: &mut PdfWriter, entry: &DailyEntry) {
    if writer.y > ENTRY_BREAK_MM {
        writer.new_page();
    } else {
        writer.y += 9.0;
    }

    let date_label = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
        .map(long_date_it)
        .unwrap_or_else(|_| entry.date.clone());
    let suffix = if entry.is_non_working_day {
        " (Giorno non lavorativo)"
    } else {
        ""
    };
    writer.line(&format!("{date_label}{suffix}"), 14.0, false, 7.0);

    writer.line("Pasti", 10.0, true, 5.5);
    let meals = if entry.meals.trim().is_empty() {
        "Nessun pasto registrato."
    } else {
        entry.meals.as_str()
    };
    writer.wrapped(meals, 10.0, 5.0);

    writer.line("Attività Fisica", 10.0, true, 5.5);
    let activity = if entry.activity.trim().is_empty() {
        "Nessuna attività registrata."
    } else {
        entry.activity.as_str()
    };
    writer.wrapped(activity, 10.0, 5.0);

    if let Some(analysis) = &entry.analysis {
        writer.y += 2.0;
        writer.macro_row(MACRO_HEADERS, true, 5.5);
        writer.macro_row(
            [
                &format!("{:.0}", analysis.calories),
                &format!("{:.1}", analysis.protein),
                &format!("{:.1}", analysis.carbs),
                &format!("{:.1}", analysis.fats),
            ]
            .map(String::as_str),
            false,
            6.0,
        );
        writer.line("Riepilogo AI", 10.0, true, 5.5);
        writer.wrapped(&analysis.summary, 10.0, 5.0);
    }
}

/// Paginated PDF report: title block, profile table, one block per entry.
pub fn entries_pdf(
    entries: &[DailyEntry],
    profile: &UserProfile,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new("Report Diario Alimentare")?;

    writer.y = 22.0;
    writer.line("Report Diario Alimentare", 18.0, false, 8.0);
    writer.set_gray(true);
    writer.line(
        &format!(
            "Periodo: dal {} al {}",
            start.format("%d/%m/%Y"),
            end.format("%d/%m/%Y")
        ),
        11.0,
        false,
        0.0,
    );
    writer.set_gray(false);

    writer.y = 45.0;
    writer.line("Profilo Utente", 14.0, false, 5.0);
    writer.rule();
    writer.two_columns("Parametro", "Valore", true, 6.5);
    for (label, value) in profile_rows(profile) {
        writer.two_columns(label, &value, false, 6.5);
    }
    writer.rule();

    for entry in entries {
        render_pdf_entry(&mut writer, entry);
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzed_entry() -> DailyEntry {
        DailyEntry {
            date: "2024-03-10".to_string(),
            meals: "Pranzo: pasta al pomodoro".to_string(),
            activity: "Camminata 30 minuti".to_string(),
            is_non_working_day: true,
            analysis: Some(NutrientAnalysis {
                calories: 1850.0,
                protein: 92.5,
                carbs: 210.0,
                fats: 61.0,
                summary: "Giornata equilibrata.".to_string(),
                micronutrients: Some(vec!["Ferro".to_string(), "Calcio".to_string()]),
            }),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let plain = DailyEntry::blank("2024-03-09");
        let bytes = entries_csv(&[plain, analyzed_entry()]).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.split("\r\n");
        assert_eq!(
            lines.next().unwrap(),
            "data,pasti,attività,giorno non lavorativo,calorie,proteine (g),\
             carboidrati (g),grassi (g),riepilogo AI,micronutrienti"
        );
        assert_eq!(lines.next().unwrap(), "2024-03-09,,,No,,,,,,");
        assert_eq!(
            lines.next().unwrap(),
            "2024-03-10,Pranzo: pasta al pomodoro,Camminata 30 minuti,Sì,\
             1850,92.5,210.0,61.0,Giornata equilibrata.,Ferro; Calcio"
        );
    }

    #[test]
    fn test_csv_escapes_embedded_quotes_and_round_trips() {
        let mut entry = DailyEntry::blank("2024-03-10");
        entry.meals = r#"Pasta, "al pomodoro""#.to_string();
        let bytes = entries_csv(&[entry]).unwrap();

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains(r#""Pasta, ""al pomodoro""""#));

        let mut reader = csv::ReaderBuilder::new().from_reader(&bytes[3..]);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], r#"Pasta, "al pomodoro""#);
    }

    #[test]
    fn test_csv_quotes_multiline_fields() {
        let mut entry = DailyEntry::blank("2024-03-10");
        entry.meals = "Colazione: caffè\nPranzo: riso".to_string();
        let bytes = entries_csv(&[entry]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("\"Colazione: caffè\nPranzo: riso\""));
    }

    #[test]
    fn test_filenames_embed_range() {
        let start = date("2024-02-09");
        let end = date("2024-03-10");
        assert_eq!(
            csv_filename(start, end),
            "diario_alimentare_2024-02-09_2024-03-10.csv"
        );
        assert_eq!(
            pdf_filename(start, end),
            "diario_alimentare_2024-02-09_2024-03-10.pdf"
        );
        assert_eq!(
            daily_analysis_filename(date("2024-03-10")),
            "analisi_giornaliera_2024-03-10.txt"
        );
        assert_eq!(
            period_report_filename(Granularity::Week, date("2024-03-10")),
            "analisi_settimanale_2024-03-10.txt"
        );
        assert_eq!(
            period_report_filename(Granularity::Year, date("2024-03-10")),
            "analisi_annuale_2024-03-10.txt"
        );
    }

    #[test]
    fn test_daily_analysis_text_layout() {
        let entry = analyzed_entry();
        let text = daily_analysis_text(date("2024-03-10"), entry.analysis.as_ref().unwrap());
        assert!(text.starts_with("Analisi Nutrizionale del 10/03/2024"));
        assert!(text.contains("Riepilogo AI:\n-------------\nGiornata equilibrata."));
        assert!(text.contains("- Calorie: 1850 kcal"));
        assert!(text.contains("- Proteine: 92.5 g"));
        assert!(text.contains("- Carboidrati: 210.0 g"));
        assert!(text.ends_with("Micronutrienti Chiave:\n----------------------\nFerro, Calcio"));
    }

    #[test]
    fn test_daily_analysis_text_without_micronutrients() {
        let analysis = NutrientAnalysis {
            calories: 1500.0,
            protein: 70.0,
            carbs: 180.0,
            fats: 50.0,
            summary: "Ok".to_string(),
            micronutrients: None,
        };
        let text = daily_analysis_text(date("2024-03-10"), &analysis);
        assert!(text.ends_with("Nessun dato specifico."));
    }

    #[test]
    fn test_period_report_text_layout() {
        let analysis = PeriodAnalysis {
            summary: "Settimana regolare.".to_string(),
            strengths: "Buone proteine.".to_string(),
            improvements: "Più fibre.".to_string(),
            suggestions: "Aggiungi legumi.".to_string(),
            encouragement: "Continua così!".to_string(),
            micronutrients_analysis: None,
        };
        let text = period_report_text(&analysis, Granularity::Week, date("2024-03-10"));
        assert!(text.starts_with("Report Settimanale: 04/03/2024 - 10/03/2024"));
        assert!(text.contains("Punti di forza:\n---------------\nBuone proteine."));
        assert!(text.ends_with("Continua così!"));
        assert!(!text.contains("Bilancio dei Micronutrienti"));
    }

    #[test]
    fn test_period_report_text_includes_micronutrient_balance() {
        let analysis = PeriodAnalysis {
            summary: "s".to_string(),
            strengths: "f".to_string(),
            improvements: "m".to_string(),
            suggestions: "c".to_string(),
            encouragement: "e".to_string(),
            micronutrients_analysis: Some("Ferro un po' basso.".to_string()),
        };
        let text = period_report_text(&analysis, Granularity::Month, date("2024-03-15"));
        assert!(text.starts_with("Report Mensile: marzo 2024"));
        assert!(text.ends_with("Bilancio dei Micronutrienti:\n----------------------------\nFerro un po' basso."));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("breve", 20), vec!["breve"]);
        assert_eq!(
            wrap_text("una riga decisamente troppo lunga", 15),
            vec!["una riga", "decisamente", "troppo lunga"]
        );
        assert_eq!(wrap_text("prima\nseconda", 20), vec!["prima", "seconda"]);
        assert_eq!(wrap_text("", 20), Vec::<String>::new());
        // Unbroken words get hard-split rather than overflowing the page.
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_pdf_smoke() {
        let entries = vec![DailyEntry::blank("2024-03-09"), analyzed_entry()];
        let bytes = entries_pdf(
            &entries,
            &UserProfile::default(),
            date("2024-02-09"),
            date("2024-03-10"),
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_pdf_paginates_many_entries() {
        let mut entries = Vec::new();
        for day in 1..=31 {
            let mut entry = DailyEntry::blank(&format!("2024-03-{day:02}"));
            entry.meals = "Colazione: yogurt e cereali\nPranzo: pasta\nCena: zuppa".to_string();
            entry.activity = "Palestra".to_string();
            entries.push(entry);
        }
        let few = entries_pdf(
            &entries[..2],
            &UserProfile::default(),
            date("2024-03-01"),
            date("2024-03-31"),
        )
        .unwrap();
        let many = entries_pdf(
            &entries,
            &UserProfile::default(),
            date("2024-03-01"),
            date("2024-03-31"),
        )
        .unwrap();
        assert!(many.len() > few.len());
    }

    #[test]
    fn test_profile_rows_labels_and_placeholders() {
        let rows = profile_rows(&UserProfile::default());
        assert_eq!(rows[0], ("Età", "N/D".to_string()));
        assert_eq!(rows[6], ("Condizioni/Dieta", "Nessuna".to_string()));

        let profile = UserProfile {
            age: Some(34),
            gender: Some(Gender::Female),
            height: Some(168.0),
            weight: Some(62.5),
            lifestyle: Some(Lifestyle::ModeratelyActive),
            goal: Some(Goal::EatHealthier),
            conditions: Some("Vegetariana".to_string()),
        };
        let rows = profile_rows(&profile);
        assert_eq!(rows[1].1, "Femmina");
        assert_eq!(rows[2].1, "168");
        assert_eq!(rows[3].1, "62.5");
        assert_eq!(rows[4].1, "Moderatamente Attivo");
        assert_eq!(rows[5].1, "Mangiare più sano");
    }
}

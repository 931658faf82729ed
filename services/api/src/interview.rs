use crate::cli::ScreenArgs;
use crate::infra::scoring_config_with_override;
use spectrum_screen::config::AppConfig;
use spectrum_screen::error::AppError;
use spectrum_screen::screening::intake::{AnswerSheet, FieldSpec, Questionnaire};
use spectrum_screen::screening::results::SCORE_LEGEND;
use spectrum_screen::screening::{
    HttpScoringClient, ScreeningResult, SubmissionController, SubmissionOutcome,
};
use std::io::{self, BufRead, Write};

const BACK_COMMAND: &str = ":back";
const QUIT_COMMAND: &str = ":quit";

enum Answer {
    Accepted,
    Back,
    EndOfInput,
}

/// Line-oriented questionnaire driver over any reader/writer pair.
pub(crate) struct Interview<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Interview<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for every missing or invalid answer until the intake sits on a valid final
    /// section. Returns `false` when input ends or the user quits.
    pub(crate) fn collect(&mut self, controller: &mut SubmissionController) -> io::Result<bool> {
        let mut revisit = false;
        'sections: loop {
            let wizard = controller.wizard();
            let progress = wizard.progress();
            let section = wizard.current_section().clone();
            writeln!(
                self.output,
                "\nStep {} of {} ({}%): {}",
                progress.step, progress.total, progress.percent, section.title
            )?;

            for field in &section.fields {
                let wizard = controller.wizard();
                let answered = wizard.value(field.key).is_some() && wizard.error(field.key).is_none();
                if answered && !revisit {
                    continue;
                }
                match self.ask_field(controller, field, revisit)? {
                    Answer::Accepted => {}
                    Answer::Back => {
                        if controller.wizard().current_index() == 0 {
                            writeln!(self.output, "  Already at the first section.")?;
                        } else if controller.retreat().is_ok() {
                            revisit = true;
                        }
                        continue 'sections;
                    }
                    Answer::EndOfInput => return Ok(false),
                }
            }
            revisit = false;

            let checked = if controller.wizard().is_last_section() {
                let current = controller.wizard().current_index();
                match controller.validate_section(current) {
                    Ok(()) => return Ok(true),
                    Err(err) => Err(err),
                }
            } else {
                controller.advance().map(|_| ())
            };
            if let Err(err) = checked {
                writeln!(self.output, "  {err}")?;
                for (key, message) in &controller.wizard().state().errors {
                    writeln!(self.output, "  - {key}: {message}")?;
                }
            }
        }
    }

    fn ask_field(
        &mut self,
        controller: &mut SubmissionController,
        field: &FieldSpec,
        keep_current: bool,
    ) -> io::Result<Answer> {
        loop {
            writeln!(self.output, "{}", field.label)?;
            for option in field.options() {
                writeln!(self.output, "    {} ({})", option.value, option.label)?;
            }
            match controller.wizard().value(field.key) {
                Some(current) if keep_current => write!(self.output, "  [{current}] > ")?,
                _ => write!(self.output, "  > ")?,
            }
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(Answer::EndOfInput);
            };
            match line.as_str() {
                BACK_COMMAND => return Ok(Answer::Back),
                QUIT_COMMAND => return Ok(Answer::EndOfInput),
                "" if keep_current && controller.wizard().value(field.key).is_some() => {
                    return Ok(Answer::Accepted)
                }
                _ => {}
            }

            if let Err(err) = controller.set_field_value(field.key, resolve_choice(field, &line)) {
                writeln!(self.output, "  {err}")?;
                return Ok(Answer::EndOfInput);
            }
            match field.validate(controller.wizard().value(field.key)) {
                Ok(()) => return Ok(Answer::Accepted),
                Err(message) => writeln!(self.output, "  {message}")?,
            }
        }
    }

    /// Returns `true` when the user wants to submit again.
    pub(crate) fn confirm_retry(&mut self, notice: &str) -> io::Result<bool> {
        writeln!(self.output, "\n{notice}")?;
        write!(
            self.output,
            "Press Enter to retry, or type {QUIT_COMMAND} to stop: "
        )?;
        self.output.flush()?;
        Ok(matches!(self.read_line()?, Some(line) if line != QUIT_COMMAND))
    }

    pub(crate) fn announce(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub(crate) fn render_questionnaire(&mut self, questionnaire: &Questionnaire) -> io::Result<()> {
        for (index, section) in questionnaire.sections().iter().enumerate() {
            writeln!(self.output, "{}. {}", index + 1, section.title)?;
            for field in &section.fields {
                writeln!(self.output, "  {}: {}", field.key, field.label)?;
                let options: Vec<_> = field
                    .options()
                    .iter()
                    .map(|option| format!("{} ({})", option.value, option.label))
                    .collect();
                if !options.is_empty() {
                    writeln!(self.output, "      {}", options.join(", "))?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn render_result(&mut self, result: &ScreeningResult) -> io::Result<()> {
        let display = &result.display;
        writeln!(self.output, "\nScreening result")?;
        match &display.prediction {
            Ok(badge) => writeln!(self.output, "  Prediction:  {}", badge.phrase)?,
            Err(err) => writeln!(self.output, "  Prediction unavailable: {err}")?,
        }
        writeln!(self.output, "  Risk level:  {}", display.risk_label)?;
        writeln!(self.output, "  Probability: {}", display.probability_text)?;
        writeln!(self.output, "  AQ-10 score: {}", display.score_text)?;
        let legend: Vec<_> = SCORE_LEGEND
            .iter()
            .map(|(range, label)| format!("{range} {label}"))
            .collect();
        writeln!(self.output, "  Score guide: {}", legend.join(" | "))?;

        if !display.recommendations.is_empty() {
            writeln!(self.output, "\nRecommendations")?;
            for recommendation in &display.recommendations {
                writeln!(self.output, "  - {recommendation}")?;
            }
        }
        writeln!(self.output, "\n{}", display.disclaimer)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Accept an option's label as well as its wire value.
fn resolve_choice(field: &FieldSpec, raw: &str) -> String {
    field
        .options()
        .iter()
        .find(|option| option.label.eq_ignore_ascii_case(raw))
        .map(|option| option.value.to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub(crate) fn run_questions() -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut interview = Interview::new(io::empty(), stdout.lock());
    interview.render_questionnaire(&Questionnaire::standard())?;
    Ok(())
}

pub(crate) async fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let scoring = scoring_config_with_override(config.scoring, args.scoring_url)?;
    let client = HttpScoringClient::new(&scoring)?;

    let mut controller = SubmissionController::standard();
    if let Some(path) = &args.answers {
        controller.apply_answers(&AnswerSheet::from_path(path)?)?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut interview = Interview::new(stdin.lock(), stdout.lock());
    interview.announce(&format!(
        "Answer each question; type {BACK_COMMAND} to return to the previous section."
    ))?;

    loop {
        if !interview.collect(&mut controller)? {
            interview.announce("Screening cancelled.")?;
            return Ok(());
        }

        interview.announce("\nSubmitting answers...")?;
        match controller.on_submit(&client).await? {
            SubmissionOutcome::Displayed => {
                if let Some(result) = controller.result() {
                    interview.render_result(result)?;
                }
                return Ok(());
            }
            SubmissionOutcome::Failed { notice } => {
                if !interview.confirm_retry(notice)? {
                    return Ok(());
                }
            }
            SubmissionOutcome::Discarded => return Ok(()),
        }
    }
}

use crate::infra::offline_predictor;
use clap::Args;
use loan_intake::error::AppError;
use loan_intake::workflows::loan::{
    predict, FeatureAssembler, FlowController, Outcome, Predictor, SessionState,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

const RESET_COMMAND: &str = ":reset";
const QUIT_COMMAND: &str = ":quit";

#[derive(Args, Debug, Default)]
pub(crate) struct InterviewArgs {
    /// Scorecard JSON to load instead of APP_SCORECARD_PATH
    #[arg(long)]
    pub(crate) scorecard: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InterviewEnd {
    Completed,
    Quit,
}

pub(crate) fn run_interview(args: InterviewArgs) -> Result<(), AppError> {
    let predictor = offline_predictor(args.scorecard)?;
    let flow = FlowController::standard();
    let assembler = FeatureAssembler::for_script(flow.script());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let end = interview(&flow, &assembler, &predictor, stdin.lock(), stdout.lock())?;
    info!(?end, "terminal interview finished");
    Ok(())
}

/// Line-oriented interview loop. Enter on a numeric prompt submits the shown default.
pub(crate) fn interview<R, W, P>(
    flow: &FlowController,
    assembler: &FeatureAssembler,
    predictor: &P,
    mut input: R,
    mut output: W,
) -> Result<InterviewEnd, AppError>
where
    R: BufRead,
    W: Write,
    P: Predictor + ?Sized,
{
    let mut state = SessionState::new();
    let mut line = String::new();

    writeln!(
        output,
        "Loan application interview. Type {RESET_COMMAND} to start over or {QUIT_COMMAND} to leave."
    )?;

    while let Some(field) = flow.current_field(&state) {
        let default = field.default_input();
        match &default {
            Some(value) => write!(output, "{} [{}] ", field.prompt, value)?,
            None => write!(output, "{} ", field.prompt)?,
        }
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(InterviewEnd::Quit);
        }
        let typed = line.trim_end_matches(['\r', '\n']);

        match typed.trim() {
            QUIT_COMMAND => return Ok(InterviewEnd::Quit),
            RESET_COMMAND => {
                flow.reset(&mut state);
                writeln!(output, "Starting over.")?;
                continue;
            }
            _ => {}
        }

        let answer = match default {
            Some(value) if typed.trim().is_empty() => value,
            _ => typed.to_string(),
        };
        if let Outcome::Rejected { message, .. } = flow.submit(&mut state, answer)? {
            writeln!(output, "{message}")?;
        }
    }

    render_results(assembler, predictor, &state, &mut output)?;
    Ok(InterviewEnd::Completed)
}

/// Print the summary of inputs, the features handed to the predictor, and its verdict.
pub(crate) fn render_results<W, P>(
    assembler: &FeatureAssembler,
    predictor: &P,
    state: &SessionState,
    output: &mut W,
) -> Result<(), AppError>
where
    W: Write,
    P: Predictor + ?Sized,
{
    writeln!(output, "\nHere is the summary of your inputs:")?;
    for (key, value) in state.answers().iter() {
        writeln!(output, "  {key}: {value}")?;
    }

    let features = assembler.assemble_session(state)?;
    writeln!(output, "\nFeatures sent to the predictor:")?;
    for (name, value) in features.iter() {
        writeln!(output, "  {name}: {value}")?;
    }

    match predict(predictor, &features) {
        Ok(prediction) => writeln!(output, "\n{}", prediction.message())?,
        Err(err) => writeln!(output, "\n{err}")?,
    }
    Ok(())
}

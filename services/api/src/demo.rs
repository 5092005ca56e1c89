use crate::infra::offline_predictor;
use crate::interview::render_results;
use clap::Args;
use loan_intake::error::AppError;
use loan_intake::workflows::loan::{
    FeatureAssembler, FlowController, Outcome, Predictor, SessionState, Speaker,
};
use std::io::Write;
use std::path::PathBuf;

/// Reference applicant, with one deliberately short ZIP Code before the valid one.
const DEMO_ANSWERS: [&str; 16] = [
    "123", "30", "M", "5", "60", "1234", "12345", "2", "1.2", "2", "0", "Rent", "0", "1", "1",
    "0",
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Scorecard JSON to load instead of APP_SCORECARD_PATH
    #[arg(long)]
    pub(crate) scorecard: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let predictor = offline_predictor(args.scorecard)?;
    let flow = FlowController::standard();
    let assembler = FeatureAssembler::for_script(flow.script());

    let stdout = std::io::stdout();
    let mut output = stdout.lock();
    demo(&flow, &assembler, &predictor, &mut output)
}

pub(crate) fn demo<W, P>(
    flow: &FlowController,
    assembler: &FeatureAssembler,
    predictor: &P,
    output: &mut W,
) -> Result<(), AppError>
where
    W: Write,
    P: Predictor + ?Sized,
{
    writeln!(output, "Loan intake demo")?;
    let mut state = SessionState::new();

    for answer in DEMO_ANSWERS {
        let Some(field) = flow.current_field(&state) else {
            break;
        };
        writeln!(output, "- {} {}", field.prompt, answer)?;
        if let Outcome::Rejected { message, .. } = flow.submit(&mut state, answer)? {
            writeln!(output, "  rejected: {message}")?;
        }
    }

    writeln!(output, "\nTranscript ({} entries):", state.transcript().len())?;
    for entry in state.transcript() {
        let speaker = match entry.speaker {
            Speaker::System => "system",
            Speaker::User => "user",
        };
        writeln!(output, "  [{speaker}] {}", entry.text)?;
    }

    render_results(assembler, predictor, &state, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_intake::workflows::loan::ScorecardPredictor;

    #[test]
    fn demo_walks_the_reference_applicant() {
        let flow = FlowController::standard();
        let assembler = FeatureAssembler::standard();
        let mut output = Vec::new();

        demo(
            &flow,
            &assembler,
            &ScorecardPredictor::default(),
            &mut output,
        )
        .expect("demo runs");
        let output = String::from_utf8(output).expect("utf8");

        assert!(output.contains("  rejected: ZIP Code must be a 5-digit number."));
        assert!(output.contains("Transcript (16 entries):"));
        assert!(output.contains("  [system] ZIP Code must be a 5-digit number."));
        assert!(output.contains("  Gender: 1"));
        assert!(output.contains("The loan is likely to be rejected."));
    }
}

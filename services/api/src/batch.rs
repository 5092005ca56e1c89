use crate::infra::offline_predictor;
use clap::Args;
use loan_intake::error::AppError;
use loan_intake::workflows::loan::{
    BatchScorer, BatchSummary, FeatureAssembler, FlowController, Predictor,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV of applicants whose headers are the interview field keys
    pub(crate) input: PathBuf,
    /// Where to write the scoring report (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Scorecard JSON to load instead of APP_SCORECARD_PATH
    #[arg(long)]
    pub(crate) scorecard: Option<PathBuf>,
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let predictor = offline_predictor(args.scorecard)?;
    let summary = score_paths(&args.input, args.output.as_deref(), &predictor)?;

    if let Some(path) = &args.output {
        println!(
            "Scored {} applicants: {} predicted, {} rejected, {} errors -> {}",
            summary.total,
            summary.predicted,
            summary.rejected,
            summary.errored,
            path.display()
        );
    }
    Ok(())
}

pub(crate) fn score_paths<P: Predictor + ?Sized>(
    input: &Path,
    output: Option<&Path>,
    predictor: &P,
) -> Result<BatchSummary, AppError> {
    let flow = FlowController::standard();
    let assembler = FeatureAssembler::for_script(flow.script());
    let scorer = BatchScorer::new(&flow, &assembler, predictor);
    let reader = BufReader::new(File::open(input)?);

    let summary = match output {
        Some(path) => scorer.score(reader, BufWriter::new(File::create(path)?))?,
        None => scorer.score(reader, std::io::stdout().lock())?,
    };
    Ok(summary)
}

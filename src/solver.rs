use crate::data::{
    Assignment, AssignmentSet, ExclusionMap, GenerationInput, GenerationOptions, GenerationOutput,
    MAX_ATTEMPTS_CEILING, Participant, PreviousPairs, ValidationInput,
};
use crate::error::AssignmentError;
use crate::graph::CompatibilityGraph;
use crate::search::CycleSearch;
use crate::validate::validate;
use log::{info, warn};
use std::time::Instant;

/// Runs the build -> search -> validate pipeline and remembers how many
/// search attempts the last call used.
#[derive(Debug, Clone)]
pub struct Generator {
    options: GenerationOptions,
    attempts: u32,
}

impl Generator {
    pub fn new(options: GenerationOptions) -> Self {
        Self {
            options,
            attempts: 0,
        }
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Search attempts made by the last `generate` call. Zero when the input
    /// was rejected before the search started.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn generate(
        &mut self,
        participants: &[Participant],
        exclusions: &ExclusionMap,
        previous: &PreviousPairs,
    ) -> Result<GenerationOutput, AssignmentError> {
        let start_time = Instant::now();
        self.attempts = 0;
        check_options(&self.options)?;

        let graph = CompatibilityGraph::build(participants, exclusions)?;
        info!(
            "Searching for a gift cycle over {} participants ({} exclusion pairs, {} previous pairs, up to {} attempts, seed {})...",
            graph.len(),
            exclusions.len(),
            previous.len(),
            self.options.max_attempts,
            self.options.seed
        );

        let found = match CycleSearch::new(&graph, previous).run(self.options.seed, self.options.max_attempts) {
            Ok(found) => found,
            Err(err) => {
                if let AssignmentError::AttemptsExhausted { attempts } = err {
                    self.attempts = attempts;
                }
                return Err(err);
            }
        };
        self.attempts = found.attempt;

        let assignments = AssignmentSet::from_cycle(&found.cycle);
        validate(assignments.as_slice(), participants, exclusions)?;

        let repeated_previous_pairs: Vec<Assignment> = assignments
            .iter()
            .filter(|a| previous.contains(a.giver_id, a.receiver_id))
            .copied()
            .collect();
        if !repeated_previous_pairs.is_empty() {
            warn!(
                "{} assignment(s) repeat a previous pairing: {}",
                repeated_previous_pairs.len(),
                repeated_previous_pairs.iter().map(Assignment::to_string).collect::<Vec<_>>().join(", ")
            );
        }

        info!("Generated {} assignments in {:.2?}", assignments.len(), start_time.elapsed());
        Ok(GenerationOutput {
            avoided_previous: repeated_previous_pairs.is_empty(),
            assignments,
            attempts: found.attempt,
            seed: self.options.seed,
            repeated_previous_pairs,
        })
    }
}

/// One-shot generation with explicit options.
pub fn generate_assignments(
    participants: &[Participant],
    exclusions: &ExclusionMap,
    previous: &PreviousPairs,
    options: GenerationOptions,
) -> Result<GenerationOutput, AssignmentError> {
    Generator::new(options).generate(participants, exclusions, previous)
}

/// Solves a request as it arrives from a caller; options it leaves out come from `fallback`.
pub fn solve(input: &GenerationInput, fallback: GenerationOptions) -> Result<GenerationOutput, AssignmentError> {
    let options = GenerationOptions {
        max_attempts: input.options.max_attempts.unwrap_or(fallback.max_attempts),
        seed: input.options.seed.unwrap_or(fallback.seed),
    };
    let exclusions = ExclusionMap::from_records(&input.exclusions);
    let previous = PreviousPairs::from_records(&input.previous_pairs);
    generate_assignments(&input.participants, &exclusions, &previous, options)
}

/// Checks an assignment set produced elsewhere against the hard rules.
pub fn check(input: &ValidationInput) -> Result<(), AssignmentError> {
    let exclusions = ExclusionMap::from_records(&input.exclusions);
    validate(&input.assignments, &input.participants, &exclusions)
}

fn check_options(options: &GenerationOptions) -> Result<(), AssignmentError> {
    if options.max_attempts == 0 {
        return Err(AssignmentError::InvalidInput(
            "maxAttempts must be at least 1".to_string(),
        ));
    }
    if options.max_attempts > MAX_ATTEMPTS_CEILING {
        return Err(AssignmentError::InvalidInput(format!(
            "maxAttempts must be at most {}",
            MAX_ATTEMPTS_CEILING
        )));
    }
    Ok(())
}

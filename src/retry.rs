use std::time::Duration;

use crate::error::Error;

/// Default delay unit; with it the schedule is 2s, 4s, 8s, ...
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry configuration. Attempt `n >= 1` waits `base_delay * 2^n` first, with no jitter or cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Multiplied by `2^attempt` to get each delay
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before `attempt`; zero for the first attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }
}

/// What a single chat attempt produced
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Request never got a response (connect error, timeout)
    Transport(reqwest::Error),
    /// Response with a status other than 200
    Status { status: u16, body: String },
    /// Body was not a chat response
    Undecodable(String),
    /// Turn not finished
    Incomplete,
    /// Turn finished with no content
    Empty,
    /// Turn finished with content
    Content(String),
}

/// What the loop should do next
#[derive(Debug)]
pub enum Step {
    Retry,
    Fail(Error),
    Done(String),
}

/// Position in the retry loop
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempt: u32,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_retries(&self) -> u32 {
        self.policy.max_retries
    }

    pub fn is_last_attempt(&self) -> bool {
        self.attempt >= self.policy.max_retries
    }

    /// Delay owed before the current attempt runs
    pub fn backoff(&self) -> Duration {
        self.policy.delay_for_attempt(self.attempt)
    }

    /// Moves to the next attempt; `false` once the budget is spent
    pub fn advance(&mut self) -> bool {
        if self.is_last_attempt() {
            return false;
        }
        self.attempt += 1;
        true
    }

    /// Decides the fate of the current attempt
    pub fn classify(&self, outcome: AttemptOutcome) -> Step {
        let last = self.is_last_attempt();
        match outcome {
            AttemptOutcome::Content(content) => Step::Done(content),
            AttemptOutcome::Status { status, body } => Step::Fail(Error::Server { status, body }),
            AttemptOutcome::Transport(source) if last => Step::Fail(Error::Connection { source }),
            AttemptOutcome::Undecodable(message) if last => Step::Fail(Error::Decode(message)),
            AttemptOutcome::Empty if last => Step::Fail(Error::EmptyResponse),
            AttemptOutcome::Incomplete
            | AttemptOutcome::Transport(_)
            | AttemptOutcome::Undecodable(_)
            | AttemptOutcome::Empty => Step::Retry,
        }
    }
}

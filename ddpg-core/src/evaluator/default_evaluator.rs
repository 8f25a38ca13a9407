//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{
    record::{Record, RecordValue::Scalar},
    Env, Policy,
};
use anyhow::Result;
use log::info;

/// Runs a fixed number of episodes and computes the average return.
///
/// Each episode ends when the environment terminates or truncates it, or after
/// `max_ep_len` steps. The length and the return of every episode are logged.
///
/// # Examples
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::new(&env_config, 42, 10, 1000)?;
/// agent.eval();
/// let record = evaluator.evaluate(&mut agent)?;
/// println!("Average return: {}", record.get_scalar("eval_return")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// The maximum length of an episode.
    max_ep_len: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P>(&mut self, policy: &mut P) -> Result<Record>
    where
        P: Policy<E>,
    {
        let mut r_total = 0f32;
        let mut len_total = 0usize;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut ep_ret = 0f32;
            let mut ep_len = 0usize;

            loop {
                let act = policy.sample(&prev_obs)?;
                let (step, _) = self.env.step(&act)?;
                ep_ret += step.reward;
                ep_len += 1;
                if step.is_done() || ep_len >= self.max_ep_len {
                    break;
                }
                prev_obs = step.obs;
            }

            info!("Validation episode {}: length = {}, return = {}", ix, ep_len, ep_ret);
            r_total += ep_ret;
            len_total += ep_len;
        }

        let n = self.n_episodes.max(1) as f32;
        Ok(Record::from_slice(&[
            ("eval_return", Scalar(r_total / n)),
            ("eval_length", Scalar(len_total as f32 / n)),
        ]))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`] with its own environment instance.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize, max_ep_len: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            max_ep_len,
            env: E::build(config, seed)?,
        })
    }
}

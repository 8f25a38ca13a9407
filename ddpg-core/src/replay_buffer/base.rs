//! Circular replay buffer.
use super::{ReplayBufferConfig, Transition, TransitionBatch};
use crate::{error::DdpgError, ExperienceBufferBase, ReplayBufferBase};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A fixed-capacity circular store of transitions.
///
/// Storage is allocated once, in [`ReplayBufferBase::build`], from the declared
/// observation and action dimensions. `write_index` is the slot overwritten by
/// the next [`ReplayBuffer::store`] and `count` the number of valid slots,
/// saturating at the capacity. The most recent `count` transitions are valid.
pub struct ReplayBuffer {
    capacity: usize,
    obs_dim: usize,
    act_dim: usize,

    /// Next slot to be written.
    write_index: usize,

    /// Number of valid entries.
    count: usize,

    obs: Vec<f32>,
    next_obs: Vec<f32>,
    act: Vec<f32>,
    reward: Vec<f32>,
    done: Vec<f32>,

    rng: StdRng,
}

fn check_dim(what: &str, expected: usize, v: &[f32]) -> Result<()> {
    if v.len() != expected {
        return Err(DdpgError::DimensionMismatch {
            what: what.to_string(),
            expected,
            got: v.len(),
        }
        .into());
    }
    Ok(())
}

impl ReplayBuffer {
    /// Stores a transition, overwriting the oldest one if the buffer is full.
    pub fn store(
        &mut self,
        obs: &[f32],
        next_obs: &[f32],
        act: &[f32],
        reward: f32,
        done: bool,
    ) -> Result<()> {
        if self.capacity == 0 {
            return Err(DdpgError::ZeroCapacity.into());
        }
        check_dim("obs", self.obs_dim, obs)?;
        check_dim("next_obs", self.obs_dim, next_obs)?;
        check_dim("act", self.act_dim, act)?;

        let i = self.write_index;
        self.obs[i * self.obs_dim..(i + 1) * self.obs_dim].copy_from_slice(obs);
        self.next_obs[i * self.obs_dim..(i + 1) * self.obs_dim].copy_from_slice(next_obs);
        self.act[i * self.act_dim..(i + 1) * self.act_dim].copy_from_slice(act);
        self.reward[i] = reward;
        self.done[i] = if done { 1.0 } else { 0.0 };

        self.write_index = (self.write_index + 1) % self.capacity;
        self.count = (self.count + 1).min(self.capacity);

        Ok(())
    }

    /// Samples `batch_size` transitions uniformly with replacement from the valid entries.
    ///
    /// There is no ordering guarantee among the sampled transitions.
    pub fn sample_batch(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        if self.count == 0 {
            return Err(DdpgError::EmptyReplayBuffer.into());
        }

        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..self.count))
            .collect::<Vec<_>>();

        Ok(self.gather(&ixs))
    }

    fn gather(&self, ixs: &[usize]) -> TransitionBatch {
        let mut batch = TransitionBatch::with_capacity(ixs.len(), self.obs_dim, self.act_dim);
        for &i in ixs.iter() {
            batch
                .obs
                .extend_from_slice(&self.obs[i * self.obs_dim..(i + 1) * self.obs_dim]);
            batch
                .next_obs
                .extend_from_slice(&self.next_obs[i * self.obs_dim..(i + 1) * self.obs_dim]);
            batch
                .act
                .extend_from_slice(&self.act[i * self.act_dim..(i + 1) * self.act_dim]);
            batch.reward.push(self.reward[i]);
            batch.done.push(self.done[i]);
        }
        batch
    }

    /// Returns the transition in slot `ix`, or `None` if the slot has never been written.
    pub fn get(&self, ix: usize) -> Option<Transition> {
        if ix >= self.count {
            return None;
        }
        Some(Transition {
            obs: self.obs[ix * self.obs_dim..(ix + 1) * self.obs_dim].to_vec(),
            next_obs: self.next_obs[ix * self.obs_dim..(ix + 1) * self.obs_dim].to_vec(),
            act: self.act[ix * self.act_dim..(ix + 1) * self.act_dim].to_vec(),
            reward: self.reward[ix],
            done: self.done[ix] == 1.0,
        })
    }

    /// Returns the most recently stored transition.
    pub fn last(&self) -> Option<Transition> {
        if self.count == 0 {
            return None;
        }
        self.get((self.write_index + self.capacity - 1) % self.capacity)
    }

    /// Returns the maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the slot overwritten by the next store.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Returns the dimensions of observations and actions.
    pub fn dims(&self) -> (usize, usize) {
        (self.obs_dim, self.act_dim)
    }
}

impl ExperienceBufferBase for ReplayBuffer {
    type Item = Transition;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.store(&tr.obs, &tr.next_obs, &tr.act, tr.reward, tr.done)
    }

    /// Returns the number of valid transitions.
    fn len(&self) -> usize {
        self.count
    }
}

impl ReplayBufferBase for ReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = TransitionBatch;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;
        let (obs_dim, act_dim) = (config.obs_dim, config.act_dim);

        Self {
            capacity,
            obs_dim,
            act_dim,
            write_index: 0,
            count: 0,
            obs: vec![0.; capacity * obs_dim],
            next_obs: vec![0.; capacity * obs_dim],
            act: vec![0.; capacity * act_dim],
            reward: vec![0.; capacity],
            done: vec![0.; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.sample_batch(size)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn buffer(capacity: usize) -> ReplayBuffer {
        let config = ReplayBufferConfig::default()
            .capacity(capacity)
            .obs_dim(2)
            .act_dim(1);
        ReplayBuffer::build(&config)
    }

    /// Stores a transition whose fields all carry the marker `m`.
    fn store_marker(buffer: &mut ReplayBuffer, m: f32) -> Result<()> {
        buffer.store(&[m, m], &[m, m], &[m], m, false)
    }

    #[test]
    fn test_count_saturates_at_capacity() -> Result<()> {
        let mut buffer = buffer(4);
        assert!(buffer.is_empty());

        for k in 1..=4 {
            store_marker(&mut buffer, k as f32)?;
            assert_eq!(buffer.len(), k);
        }
        for _ in 0..3 {
            store_marker(&mut buffer, 9.0)?;
            assert_eq!(buffer.len(), 4);
        }

        Ok(())
    }

    #[test]
    fn test_fifo_overwrite() -> Result<()> {
        let mut buffer = buffer(5);
        for m in 0..7 {
            store_marker(&mut buffer, m as f32)?;
        }

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.write_index(), 2);

        // Slots 0 and 1 were overwritten by markers 5 and 6.
        let markers = (0..5)
            .map(|i| buffer.get(i).unwrap().reward)
            .collect::<Vec<_>>();
        assert_eq!(markers, vec![5., 6., 2., 3., 4.]);

        // In circular order starting from the oldest entry.
        let oldest_first = (0..5)
            .map(|j| buffer.get((buffer.write_index() + j) % 5).unwrap().reward)
            .collect::<Vec<_>>();
        assert_eq!(oldest_first, vec![2., 3., 4., 5., 6.]);
        assert_eq!(buffer.last().unwrap().reward, 6.);

        Ok(())
    }

    #[test]
    fn test_sample_from_valid_entries_only() -> Result<()> {
        let mut buffer = buffer(100);
        for m in 1..=3 {
            store_marker(&mut buffer, m as f32)?;
        }

        let batch = buffer.sample_batch(64)?;
        assert_eq!(batch.len(), 64);
        assert_eq!(batch.obs.len(), 64 * 2);
        assert_eq!(batch.next_obs.len(), 64 * 2);
        assert_eq!(batch.act.len(), 64);
        assert_eq!(batch.done.len(), 64);

        // Never-written slots hold zeros, valid ones hold markers 1..=3.
        for (i, r) in batch.reward.iter().enumerate() {
            assert!((1.0..=3.0).contains(r));
            assert_eq!(batch.obs[2 * i], *r);
            assert_eq!(batch.act[i], *r);
        }

        Ok(())
    }

    #[test]
    fn test_sample_batch_larger_than_count() -> Result<()> {
        let mut buffer = buffer(10);
        store_marker(&mut buffer, 1.0)?;

        let batch = buffer.sample_batch(32)?;
        assert_eq!(batch.len(), 32);
        assert!(batch.reward.iter().all(|r| *r == 1.0));

        Ok(())
    }

    #[test]
    fn test_empty_buffer_cannot_be_sampled() {
        let mut buffer = buffer(10);
        assert!(buffer.sample_batch(1).is_err());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut buffer = buffer(10);
        let res = buffer.store(&[0.0, 0.0, 0.0], &[0.0, 0.0], &[0.0], 0.0, false);
        assert!(res.is_err());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = buffer(0);
        let res = store_marker(&mut buffer, 1.0);
        assert!(matches!(
            res.unwrap_err().downcast_ref::<DdpgError>(),
            Some(DdpgError::ZeroCapacity)
        ));
        assert!(buffer.is_empty());
        assert!(buffer.last().is_none());
        assert!(buffer.sample_batch(1).is_err());
    }

    #[test]
    fn test_done_flag_is_kept() -> Result<()> {
        let mut buffer = buffer(3);
        buffer.push(Transition {
            obs: vec![0.0, 1.0],
            next_obs: vec![1.0, 2.0],
            act: vec![0.5],
            reward: -1.0,
            done: true,
        })?;
        let tr = buffer.get(0).unwrap();
        assert!(tr.done);
        assert_eq!(tr.next_obs, vec![1.0, 2.0]);

        Ok(())
    }
}

use crate::CatchEnvConfig;
use anyhow::Result;
use border_core::{error::BorderError, ArrayObs, Env, Step};
use log::trace;
use std::convert::TryFrom;

/// Pixel value of the ball and the paddle.
const ON: f32 = 255.0;

/// Actions of [`CatchEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatchAct {
    /// Moves the paddle one cell to the left.
    Left,

    /// Keeps the paddle.
    Stay,

    /// Moves the paddle one cell to the right.
    Right,
}

impl TryFrom<usize> for CatchAct {
    type Error = BorderError;

    fn try_from(act: usize) -> Result<Self, Self::Error> {
        match act {
            0 => Ok(Self::Left),
            1 => Ok(Self::Stay),
            2 => Ok(Self::Right),
            _ => Err(BorderError::EnvFailure(format!("Invalid action {}", act))),
        }
    }
}

/// The catch game.
///
/// Observations have shape `[1, rows * cell_size, cols * cell_size]`, with pixels of the ball
/// and the paddle set to 255 and the others to 0.
pub struct CatchEnv {
    config: CatchEnvConfig,
    rng: fastrand::Rng,
    ball_row: usize,
    ball_col: usize,
    paddle_col: usize,
    balls: usize,
    is_done: bool,
}

impl CatchEnv {
    fn drop_ball(&mut self) {
        self.ball_row = 0;
        self.ball_col = self.rng.usize(..self.config.cols);
    }

    fn fill_cell(&self, data: &mut [f32], row: usize, col: usize) {
        let c = self.config.cell_size;
        let width = self.config.cols * c;
        for y in row * c..(row + 1) * c {
            let start = y * width + col * c;
            data[start..start + c].iter_mut().for_each(|v| *v = ON);
        }
    }

    fn obs(&self) -> Result<ArrayObs> {
        let shape = self.config.obs_shape();
        let mut data = vec![0f32; shape.iter().product()];
        self.fill_cell(&mut data, self.ball_row, self.ball_col);
        self.fill_cell(&mut data, self.config.rows - 1, self.paddle_col);
        ArrayObs::new(shape, data)
    }

    /// Returns the column of the ball and the column of the paddle.
    pub fn positions(&self) -> (usize, usize) {
        (self.ball_col, self.paddle_col)
    }
}

impl Env for CatchEnv {
    type Config = CatchEnvConfig;
    type Obs = ArrayObs;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        config.check()?;
        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed as u64),
            ball_row: 0,
            ball_col: 0,
            paddle_col: config.cols / 2,
            balls: 0,
            is_done: true,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.paddle_col = self.config.cols / 2;
        self.balls = 0;
        self.is_done = false;
        self.drop_ball();
        self.obs()
    }

    fn step(&mut self, act: usize) -> Result<Step<Self>> {
        if self.is_done {
            return Err(BorderError::EnvFailure("Stepped a finished episode".into()).into());
        }

        self.paddle_col = match CatchAct::try_from(act)? {
            CatchAct::Left => self.paddle_col.saturating_sub(1),
            CatchAct::Stay => self.paddle_col,
            CatchAct::Right => (self.paddle_col + 1).min(self.config.cols - 1),
        };
        self.ball_row += 1;

        let mut reward = 0.0;
        if self.ball_row == self.config.rows - 1 {
            reward = match self.ball_col == self.paddle_col {
                true => 1.0,
                false => -1.0,
            };
            self.balls += 1;
            trace!("Ball {} landed, reward = {}", self.balls, reward);
            self.is_done = self.balls == self.config.balls_per_episode;
        }

        // The last ball stays in the image of the terminal step
        let obs = self.obs()?;
        if reward != 0.0 && !self.is_done {
            self.drop_ball();
        }

        Ok(Step::new(obs, act, reward, self.is_done, false))
    }

    fn n_actions(&self) -> usize {
        3
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use border_core::Obs;
    use test_log::test;

    fn config() -> CatchEnvConfig {
        CatchEnvConfig::default().rows(5).cols(4).balls_per_episode(3)
    }

    /// Runs an episode, returning the total reward and the number of steps.
    fn run_episode(env: &mut CatchEnv, policy: impl Fn(&CatchEnv) -> usize) -> Result<(f32, usize)> {
        env.reset()?;
        let mut total = 0.0;
        let mut steps = 0;
        loop {
            let step = env.step(policy(env))?;
            total += step.reward;
            steps += 1;
            if step.is_done() {
                return Ok((total, steps));
            }
        }
    }

    fn follow_ball(env: &CatchEnv) -> usize {
        let (ball, paddle) = env.positions();
        match ball.cmp(&paddle) {
            std::cmp::Ordering::Less => 0,
            std::cmp::Ordering::Equal => 1,
            std::cmp::Ordering::Greater => 2,
        }
    }

    #[test]
    fn test_perfect_player() -> Result<()> {
        let mut env = CatchEnv::build(&config(), 0)?;
        for _ in 0..3 {
            let (total, steps) = run_episode(&mut env, follow_ball)?;
            assert_eq!(total, 3.0);
            assert_eq!(steps, 3 * 4);
        }
        Ok(())
    }

    #[test]
    fn test_rewards_are_bounded() -> Result<()> {
        let mut env = CatchEnv::build(&config().cols(10), 1)?;
        for _ in 0..5 {
            let (total, _) = run_episode(&mut env, |_| 0)?;
            assert!((-3.0..=3.0).contains(&total));
        }
        Ok(())
    }

    #[test]
    fn test_observation() -> Result<()> {
        let config = config().cell_size(2);
        let mut env = CatchEnv::build(&config, 7)?;
        let obs = env.reset()?;
        assert_eq!(obs.shape(), &[1, 10, 8]);

        // The ball and the paddle occupy one cell each
        let lit = obs.as_slice().iter().filter(|&&v| v == ON).count();
        assert_eq!(lit, 2 * 4);
        let (ball, _) = env.positions();
        assert_eq!(obs.as_slice()[ball * 2], ON);
        Ok(())
    }

    #[test]
    fn test_same_seed_same_episode() -> Result<()> {
        let mut env1 = CatchEnv::build(&config(), 3)?;
        let mut env2 = CatchEnv::build(&config(), 3)?;
        assert_eq!(env1.reset()?.as_slice(), env2.reset()?.as_slice());
        for _ in 0..8 {
            let s1 = env1.step(2)?;
            let s2 = env2.step(2)?;
            assert_eq!(s1.obs.as_slice(), s2.obs.as_slice());
            assert_eq!(s1.reward, s2.reward);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_steps() -> Result<()> {
        let mut env = CatchEnv::build(&config(), 0)?;
        assert!(env.step(1).is_err());
        env.reset()?;
        assert!(env.step(3).is_err());
        assert_eq!(env.n_actions(), 3);
        Ok(())
    }
}

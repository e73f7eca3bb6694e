//! Utilities.
use anyhow::Result;
use border_core::{
    record::{Record, RecordValue},
    Obs,
};
use candle_core::{backprop::GradStore, Device, Tensor, Var};
use candle_nn::VarMap;

/// Stacks observations into a tensor of shape `[n_obs, obs_shape..]`.
pub fn obs_to_tensor<'a, O, I>(obs: I, device: &Device) -> Result<Tensor>
where
    O: Obs + 'a,
    I: IntoIterator<Item = &'a O>,
{
    let mut shape: Option<Vec<usize>> = None;
    let mut data = vec![];
    let mut n = 0;

    for o in obs.into_iter() {
        match &shape {
            None => shape = Some(o.shape().to_vec()),
            Some(s) if s.as_slice() != o.shape() => {
                return Err(border_core::error::BorderError::ObsShapeMismatch {
                    expected: s.clone(),
                    actual: o.shape().to_vec(),
                }
                .into())
            }
            _ => {}
        }
        data.extend_from_slice(o.as_slice());
        n += 1;
    }

    let mut shape = match shape {
        Some(shape) => shape,
        None => anyhow::bail!("Cannot create a tensor from no observations"),
    };
    shape.insert(0, n);
    Ok(Tensor::from_vec(data, shape, device)?)
}

/// Returns the standard deviation of a tensor.
pub fn std(t: &Tensor) -> Result<f32> {
    Ok(t
        .broadcast_sub(&t.mean_all()?)?
        .powf(2f64)?
        .mean_all()?
        .sqrt()?
        .to_vec0::<f32>()?)
}

/// Returns the mean and standard deviation of the parameters.
pub fn param_stats(varmap: &VarMap) -> Result<Record> {
    let mut record = Record::empty();

    for (k, v) in varmap.data().lock().unwrap().iter() {
        let m: f32 = v.mean_all()?.to_vec0()?;
        let k_mean = format!("{}_mean", &k);
        record.insert(k_mean, RecordValue::Scalar(m));

        let m: f32 = std(v.as_tensor())?;
        let k_std = format!("{}_std", &k);
        record.insert(k_std, RecordValue::Scalar(m));
    }

    Ok(record)
}

/// Statistics of a flattened gradient vector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradStats {
    /// Root mean square of the elements.
    pub l2: f32,

    /// Maximum absolute value of the elements.
    pub max: f32,

    /// Variance of the elements.
    pub var: f32,
}

impl GradStats {
    /// Computes the statistics. All values are zero for an empty vector.
    pub fn from_flat(grads: &[f32]) -> Self {
        if grads.is_empty() {
            return Self::default();
        }
        let n = grads.len() as f64;
        let mean = grads.iter().map(|&g| g as f64).sum::<f64>() / n;
        let sq_mean = grads.iter().map(|&g| (g as f64).powi(2)).sum::<f64>() / n;
        let var = grads
            .iter()
            .map(|&g| (g as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let max = grads.iter().fold(0f32, |m, g| m.max(g.abs()));

        Self {
            l2: sq_mean.sqrt() as f32,
            max,
            var: var as f32,
        }
    }
}

/// Concatenates the gradients of the given variables into a vector.
///
/// A variable without a gradient contributes zeros, so the vector always covers every
/// element of the parameters.
pub fn flatten_grads(grads: &GradStore, vars: &[Var]) -> Result<Vec<f32>> {
    let mut flat = vec![];
    for var in vars.iter() {
        match grads.get(var.as_tensor()) {
            Some(g) => flat.extend(g.flatten_all()?.to_vec1::<f32>()?),
            None => flat.extend(std::iter::repeat(0f32).take(var.elem_count())),
        }
    }
    Ok(flat)
}

/// Adds the gradients in `src` onto those in `dest`.
pub fn accumulate_grads(dest: &mut GradStore, mut src: GradStore, vars: &[Var]) -> Result<()> {
    for var in vars.iter() {
        let t = var.as_tensor();
        if let Some(g_src) = src.remove(t) {
            let g = match dest.remove(t) {
                Some(g_dest) => (g_dest + g_src)?,
                None => g_src,
            };
            dest.insert(t, g);
        }
    }
    Ok(())
}

/// Returns the global L2 norm of the gradients of the given variables.
pub fn grad_norm(grads: &GradStore, vars: &[Var]) -> Result<f32> {
    let mut sum_sq = 0f64;
    for var in vars.iter() {
        if let Some(g) = grads.get(var.as_tensor()) {
            sum_sq += g.sqr()?.sum_all()?.to_vec0::<f32>()? as f64;
        }
    }
    Ok(sum_sq.sqrt() as f32)
}

/// Scales the gradients so that their global L2 norm does not exceed `max_norm`.
///
/// Returns the global norm before clipping. Gradients with a non-finite norm are left
/// untouched.
pub fn clip_grad_norm(grads: &mut GradStore, vars: &[Var], max_norm: f64) -> Result<f32> {
    let total_norm = grad_norm(grads, vars)? as f64;
    if !total_norm.is_finite() {
        return Ok(total_norm as f32);
    }
    let coef = max_norm / (total_norm + 1e-6);

    if coef < 1.0 {
        for var in vars.iter() {
            let t = var.as_tensor();
            if let Some(g) = grads.remove(t) {
                grads.insert(t, (g * coef)?);
            }
        }
    }

    Ok(total_norm as f32)
}

// ============================================================
// Layer 5 — Learning-Rate Schedule
// ============================================================
// Linear warmup to the base rate, then linear decay to zero at
// the last training step:
//
//   warmup = warmup_ratio · total          (may be fractional)
//   step < warmup:  lr = base · step / max(1, warmup)
//   otherwise:      lr = base · max(0, (total - step) / max(1, total - warmup))
//
// The optimizer step for global step `s` uses `lr()` before the
// schedule is advanced; after the last step lr() reports 0.
//
// Reference: Devlin et al. (2019) BERT fine-tuning schedule

#[derive(Debug, Clone)]
pub struct LinearWarmupSchedule {
    base_lr:      f64,
    warmup_steps: f64,
    total_steps:  usize,
    current:      usize,
}

impl LinearWarmupSchedule {
    /// `warmup_ratio` is the fraction of `total_steps` spent ramping up.
    pub fn new(base_lr: f64, warmup_ratio: f64, total_steps: usize) -> Self {
        let warmup_steps = warmup_ratio.clamp(0.0, 1.0) * total_steps as f64;
        Self { base_lr, warmup_steps, total_steps, current: 0 }
    }

    pub fn warmup_steps(&self) -> f64 {
        self.warmup_steps
    }

    /// Learning rate for the current step.
    pub fn lr(&self) -> f64 {
        self.factor(self.current) * self.base_lr
    }

    /// Move to the next step and return its learning rate.
    pub fn step(&mut self) -> f64 {
        self.current += 1;
        self.lr()
    }

    fn factor(&self, step: usize) -> f64 {
        let step  = step as f64;
        let total = self.total_steps as f64;
        if step < self.warmup_steps {
            return step / self.warmup_steps.max(1.0);
        }
        ((total - step) / (total - self.warmup_steps).max(1.0)).max(0.0)
    }
}

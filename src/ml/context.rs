// ============================================================
// Layer 5 — Compute Context
// ============================================================
// Decides where the network runs:
//
//   --num-gpus 0  → one CPU device  (burn NdArray backend)
//   --num-gpus n  → n GPU devices   (burn Wgpu backend)
//
// --batch-size is per device, so the loader's batch size is
// batch_size * max(1, num_gpus) and each batch is later split
// back into per-device shards.

use burn::backend::wgpu::WgpuDevice;

use crate::domain::{error::EvalError, precision::DType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeContext {
    Cpu,
    Gpu { count: usize },
}

/// Returns the context and the effective (total) batch size
pub fn prepare_context(num_gpus: usize, batch_size: usize) -> (ComputeContext, usize) {
    let ctx = if num_gpus > 0 {
        ComputeContext::Gpu { count: num_gpus }
    } else {
        ComputeContext::Cpu
    };
    (ctx, batch_size * num_gpus.max(1))
}

impl ComputeContext {
    pub fn num_devices(&self) -> usize {
        match self {
            ComputeContext::Cpu            => 1,
            ComputeContext::Gpu { count }  => *count,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ComputeContext::Cpu           => "cpu(0)".to_string(),
            ComputeContext::Gpu { count } => (0..*count)
                .map(|i| format!("gpu({i})"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn wgpu_devices(&self) -> Vec<WgpuDevice> {
        (0..self.num_devices())
            .map(WgpuDevice::DiscreteGpu)
            .collect()
    }

    /// float16 needs a GPU backend; the CPU backend computes in f32 only
    pub fn check_dtype(&self, dtype: DType) -> Result<(), EvalError> {
        match (self, dtype) {
            (ComputeContext::Cpu, DType::Float16) => Err(EvalError::UnsupportedDType {
                dtype:   dtype.to_string(),
                context: self.describe(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_context_keeps_batch_size() {
        let (ctx, batch_size) = prepare_context(0, 512);
        assert_eq!(ctx, ComputeContext::Cpu);
        assert_eq!(batch_size, 512);
        assert_eq!(ctx.num_devices(), 1);
    }

    #[test]
    fn test_gpu_context_scales_batch_size() {
        let (ctx, batch_size) = prepare_context(3, 100);
        assert_eq!(ctx, ComputeContext::Gpu { count: 3 });
        assert_eq!(batch_size, 300);
        assert_eq!(ctx.describe(), "gpu(0), gpu(1), gpu(2)");
        assert_eq!(ctx.wgpu_devices().len(), 3);
    }

    #[test]
    fn test_float16_rejected_on_cpu() {
        let (cpu, _) = prepare_context(0, 1);
        let (gpu, _) = prepare_context(1, 1);
        assert!(cpu.check_dtype(DType::Float16).is_err());
        assert!(cpu.check_dtype(DType::Float32).is_ok());
        assert!(gpu.check_dtype(DType::Float16).is_ok());
    }
}

//! Candle device selection.

use candle_core::Device;

/// Returns the best available device.
///
/// With the `metal` feature this tries a Metal device, with `cuda` a CUDA
/// device. Either falls back to CPU when the accelerator cannot be opened.
pub fn best_device() -> Device {
    #[cfg(feature = "metal")]
    {
        Device::new_metal(0).unwrap_or(Device::Cpu)
    }
    #[cfg(all(feature = "cuda", not(feature = "metal")))]
    {
        Device::new_cuda(0).unwrap_or(Device::Cpu)
    }
    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    {
        Device::Cpu
    }
}

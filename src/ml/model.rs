use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

/// Output channels of the four stages before width scaling
const STAGE_CHANNELS: [usize; 4] = [64, 128, 256, 512];
const INIT_BLOCK_CHANNELS: usize = 64;
const BOTTLENECK_FACTOR: usize = 4;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct ResNetConfig {
    /// Units per stage, e.g. [2, 2, 2, 2] for ResNet-18
    pub layers:      Vec<usize>,
    pub bottleneck:  bool,
    pub num_classes: usize,
    pub in_channels: usize,
    #[config(default = 1.0)]
    pub width_scale: f64,
}

impl ResNetConfig {
    /// Output channels of every unit, stage by stage.
    ///
    /// Width scaling shrinks all units except the very last one,
    /// which keeps the full width feeding the classifier.
    pub fn unit_channels(&self) -> Vec<Vec<usize>> {
        let factor = if self.bottleneck { BOTTLENECK_FACTOR } else { 1 };
        let mut channels: Vec<Vec<usize>> = self
            .layers
            .iter()
            .zip(STAGE_CHANNELS.iter())
            .map(|(&n, &c)| vec![c * factor; n])
            .collect();

        if self.width_scale != 1.0 {
            let last_stage = channels.len().saturating_sub(1);
            for (i, stage) in channels.iter_mut().enumerate() {
                let last_unit = stage.len().saturating_sub(1);
                for (j, c) in stage.iter_mut().enumerate() {
                    if i != last_stage || j != last_unit {
                        *c = (*c as f64 * self.width_scale) as usize;
                    }
                }
            }
        }
        channels
    }

    pub fn init_block_channels(&self) -> usize {
        if self.width_scale != 1.0 {
            (INIT_BLOCK_CHANNELS as f64 * self.width_scale) as usize
        } else {
            INIT_BLOCK_CHANNELS
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ResNet<B> {
        let init_channels = self.init_block_channels();
        let stem = ConvBn::new(self.in_channels, init_channels, 7, 2, 3, device);
        let pool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        let mut units    = Vec::new();
        let mut in_chans = init_channels;
        for (i, stage) in self.unit_channels().into_iter().enumerate() {
            for (j, out_chans) in stage.into_iter().enumerate() {
                let stride = if j == 0 && i != 0 { 2 } else { 1 };
                units.push(ResUnit::new(in_chans, out_chans, stride, self.bottleneck, device));
                in_chans = out_chans;
            }
        }

        let pool_out = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let output   = LinearConfig::new(in_chans, self.num_classes).init(device);

        ResNet { stem, pool, units, pool_out, output }
    }
}

/// Convolution without bias followed by batch normalisation
#[derive(Module, Debug)]
pub struct ConvBn<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn:   BatchNorm<B>,
}

impl<B: Backend> ConvBn<B> {
    fn new(
        in_channels:  usize,
        out_channels: usize,
        kernel:       usize,
        stride:       usize,
        padding:      usize,
        device:       &B::Device,
    ) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [kernel, kernel])
            .with_stride([stride, stride])
            .with_padding(PaddingConfig2d::Explicit(padding, padding))
            .with_bias(false)
            .init(device);
        let bn = BatchNormConfig::new(out_channels).init(device);
        Self { conv, bn }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }

    /// Running mean + running variance entries of the batch norm
    fn num_running_stats(&self) -> usize {
        2 * self.bn.gamma.val().dims()[0]
    }
}

/// One residual unit.
///
/// Basic:      3x3(stride) → 3x3
/// Bottleneck: 1x1 → 3x3(stride) → 1x1, inner width = out / 4
///
/// ReLU follows every conv except the last, which is activated
/// only after the identity is added.
#[derive(Module, Debug)]
pub struct ResUnit<B: Backend> {
    pub body:       Vec<ConvBn<B>>,
    pub downsample: Option<ConvBn<B>>,
}

impl<B: Backend> ResUnit<B> {
    fn new(
        in_channels:  usize,
        out_channels: usize,
        stride:       usize,
        bottleneck:   bool,
        device:       &B::Device,
    ) -> Self {
        let body = if bottleneck {
            let mid = out_channels / BOTTLENECK_FACTOR;
            vec![
                ConvBn::new(in_channels, mid, 1, 1, 0, device),
                ConvBn::new(mid, mid, 3, stride, 1, device),
                ConvBn::new(mid, out_channels, 1, 1, 0, device),
            ]
        } else {
            vec![
                ConvBn::new(in_channels, out_channels, 3, stride, 1, device),
                ConvBn::new(out_channels, out_channels, 3, 1, 1, device),
            ]
        };

        let downsample = (stride != 1 || in_channels != out_channels)
            .then(|| ConvBn::new(in_channels, out_channels, 1, stride, 0, device));

        Self { body, downsample }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let identity = match &self.downsample {
            Some(ds) => ds.forward(x.clone()),
            None     => x.clone(),
        };

        let last  = self.body.len() - 1;
        let mut y = x;
        for (i, conv) in self.body.iter().enumerate() {
            y = conv.forward(y);
            if i != last {
                y = relu(y);
            }
        }
        relu(y + identity)
    }

    fn num_running_stats(&self) -> usize {
        self.body.iter().map(ConvBn::num_running_stats).sum::<usize>()
            + self.downsample.as_ref().map_or(0, ConvBn::num_running_stats)
    }
}

#[derive(Module, Debug)]
pub struct ResNet<B: Backend> {
    pub stem:     ConvBn<B>,
    pub pool:     MaxPool2d,
    pub units:    Vec<ResUnit<B>>,
    pub pool_out: AdaptiveAvgPool2d,
    pub output:   Linear<B>,
}

impl<B: Backend> ResNet<B> {
    /// images: [batch, channels, height, width] → logits: [batch, classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.stem.forward(images));
        let mut x = self.pool.forward(x);
        for unit in &self.units {
            x = unit.forward(x);
        }
        let x = self.pool_out.forward(x); // [batch, channels, 1, 1]
        let [batch_size, channels, _, _] = x.dims();
        self.output.forward(x.reshape([batch_size, channels]))
    }

    /// Parameters updated by training.
    ///
    /// `num_params` also counts the batch norm running statistics,
    /// which are buffers and not trained.
    pub fn num_trainable_params(&self) -> usize {
        let running_stats = self.stem.num_running_stats()
            + self.units.iter().map(ResUnit::num_running_stats).sum::<usize>();
        self.num_params() - running_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_resnet18_parameter_count() {
        let cfg = ResNetConfig::new(vec![2, 2, 2, 2], false, 1000, 3);
        let net: ResNet<B> = cfg.init(&Default::default());
        assert_eq!(net.num_trainable_params(), 11_689_512);
        // 4800 batch norm channels, each with a running mean and variance
        assert_eq!(net.num_params() - net.num_trainable_params(), 9_600);
    }

    #[test]
    fn test_resnet50_parameter_count() {
        let cfg = ResNetConfig::new(vec![3, 4, 6, 3], true, 1000, 3);
        let net: ResNet<B> = cfg.init(&Default::default());
        assert_eq!(net.num_trainable_params(), 25_557_032);
    }

    #[test]
    fn test_width_scale_keeps_last_unit_full() {
        let cfg = ResNetConfig::new(vec![2, 2, 2, 2], false, 1000, 3).with_width_scale(0.25);
        let ch  = cfg.unit_channels();
        assert_eq!(cfg.init_block_channels(), 16);
        assert_eq!(ch[0], vec![16, 16]);
        assert_eq!(ch[3], vec![128, 512]);
    }

    #[test]
    fn test_bottleneck_channels_are_expanded() {
        let cfg = ResNetConfig::new(vec![3, 4, 6, 3], true, 1000, 3);
        let ch  = cfg.unit_channels();
        assert_eq!(ch[0][0], 256);
        assert_eq!(ch[3][2], 2048);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let cfg    = ResNetConfig::new(vec![1, 1, 1, 1], false, 7, 3).with_width_scale(0.125);
        let net: ResNet<B> = cfg.init(&device);
        let images = Tensor::<B, 4>::zeros([2, 3, 32, 32], &device);
        assert_eq!(net.forward(images).dims(), [2, 7]);
    }

    #[test]
    fn test_bottleneck_forward_shape() {
        let device = Default::default();
        let cfg    = ResNetConfig::new(vec![1, 1, 1, 1], true, 5, 1).with_width_scale(0.125);
        let net: ResNet<B> = cfg.init(&device);
        let images = Tensor::<B, 4>::zeros([1, 1, 32, 32], &device);
        assert_eq!(net.forward(images).dims(), [1, 5]);
    }
}

use std::fmt;

use super::error::{DatasetError, Result};
use super::model::{ImageTensor, Target};

pub type ImageTransform = Box<dyn Fn(ImageTensor) -> ImageTensor + Send + Sync>;
pub type TargetTransform = Box<dyn Fn(Target) -> Target + Send + Sync>;
pub type JointTransform = Box<dyn Fn(ImageTensor, Target) -> (ImageTensor, Target) + Send + Sync>;

/// Caller-supplied post-load transforms.
///
/// Either a joint transform or the separate image/target transforms may be
/// given, not both.
#[derive(Default)]
pub struct Transforms {
    image: Option<ImageTransform>,
    target: Option<TargetTransform>,
    joint: Option<JointTransform>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image<F>(mut self, f: F) -> Self
    where
        F: Fn(ImageTensor) -> ImageTensor + Send + Sync + 'static,
    {
        self.image = Some(Box::new(f));
        self
    }

    pub fn target<F>(mut self, f: F) -> Self
    where
        F: Fn(Target) -> Target + Send + Sync + 'static,
    {
        self.target = Some(Box::new(f));
        self
    }

    pub fn joint<F>(mut self, f: F) -> Self
    where
        F: Fn(ImageTensor, Target) -> (ImageTensor, Target) + Send + Sync + 'static,
    {
        self.joint = Some(Box::new(f));
        self
    }

    /// Reject a joint transform mixed with separate ones.
    pub fn validate(&self) -> Result<()> {
        if self.joint.is_some() && (self.image.is_some() || self.target.is_some()) {
            return Err(DatasetError::Configuration(
                "only a joint transform or image/target transforms can be passed, not both"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.image.is_none() && self.target.is_none() && self.joint.is_none()
    }

    pub fn apply(&self, image: ImageTensor, target: Target) -> (ImageTensor, Target) {
        if let Some(joint) = &self.joint {
            return joint(image, target);
        }
        let image = match &self.image {
            Some(f) => f(image),
            None => image,
        };
        let target = match &self.target {
            Some(f) => f(target),
            None => target,
        };
        (image, target)
    }
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transforms")
            .field("image", &self.image.is_some())
            .field("target", &self.target.is_some())
            .field("joint", &self.joint.is_some())
            .finish()
    }
}

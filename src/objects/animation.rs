//! Animations: keyframe sources, samplers and the channels that bind
//! them to scene targets.

use crate::objects::common::Uri;
use crate::objects::geometry::{Input, Source};
use crate::objects::ownership::{DocumentId, OwnedList};

/// A `<sampler>` combining input and output sources into a curve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationSampler {
    /// Identifier channels refer to
    pub id: Option<String>,
    /// INPUT, OUTPUT, INTERPOLATION, ... inputs
    pub inputs: Vec<Input>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl AnimationSampler {
    /// Returns the input with `semantic`.
    pub fn input(&self, semantic: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.semantic == semantic)
    }
}

document_aware!(AnimationSampler);

entity_builder! {
    /// Builder for [`AnimationSampler`].
    AnimationSamplerBuilder => AnimationSampler {
        required {}
        optional { id: String }
        collections { inputs: Vec<Input> }
        construct: AnimationSampler::default,
    }
}

/// A `<channel>` driving one target value from a sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    /// The sampler
    pub source: Uri,
    /// Target address, e.g. `node-1/rotateX.ANGLE`
    pub target: String,
}

impl Channel {
    /// Creates a channel.
    pub fn new(source: Uri, target: String) -> Self {
        Self { source, target }
    }

    /// The id of the element the target address starts from.
    pub fn target_id(&self) -> &str {
        self.target
            .split(['/', '.', '('])
            .next()
            .unwrap_or(&self.target)
    }
}

entity_builder! {
    /// Builder for [`Channel`].
    ChannelBuilder => Channel {
        required { source: Uri, target: String }
        optional {}
        collections {}
        construct: Channel::new,
    }
}

/// An animation from `<library_animations>`. Animations nest.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    /// Document-wide identifier
    pub id: Option<String>,
    /// Human-readable name
    pub name: Option<String>,
    sources: OwnedList<Source>,
    samplers: OwnedList<AnimationSampler>,
    /// Channels
    pub channels: Vec<Channel>,
    children: OwnedList<Animation>,
    #[cfg_attr(feature = "serde", serde(skip))]
    document: Option<DocumentId>,
}

impl Animation {
    /// Creates an empty animation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a sampler by a `#id` reference.
    pub fn sampler(&self, uri: &Uri) -> Option<&AnimationSampler> {
        let id = uri.fragment()?;
        self.samplers.iter().find(|s| s.id.as_deref() == Some(id))
    }

    /// Counts the channels of this animation and all nested ones.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
            + self
                .children
                .iter()
                .map(Animation::channel_count)
                .sum::<usize>()
    }
}

document_aware!(Animation => sources, samplers, children);
impl_element!(Animation);
owned_fields!(Animation {
    /// Keyframe data
    sources / update_sources: OwnedList<Source>,
    /// Samplers
    samplers / update_samplers: OwnedList<AnimationSampler>,
    /// Nested animations
    children / update_children: OwnedList<Animation>,
});

entity_builder! {
    /// Builder for [`Animation`].
    AnimationBuilder => Animation {
        required {}
        optional { id: String, name: String }
        collections {
            sources: OwnedList<Source>,
            samplers: OwnedList<AnimationSampler>,
            channels: Vec<Channel>,
            children: OwnedList<Animation>,
        }
        construct: Animation::new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DocumentAware, Seal};

    #[test]
    fn test_channel_target_id() {
        let channel = Channel::new(
            Uri::parse("#rot-sampler").unwrap(),
            "node-1/rotateX.ANGLE".to_string(),
        );
        assert_eq!(channel.target_id(), "node-1");
    }

    #[test]
    fn test_nested_animation_attach() {
        let doc = DocumentId::next();
        let mut child = AnimationBuilder::new();
        child.sources.push(Source::new("times".to_string()));
        child.channels.push(Channel::new(
            Uri::parse("#s").unwrap(),
            "n/translate".to_string(),
        ));
        let child = child.into_entity().unwrap();

        let mut parent = Animation::new();
        parent.update_children(|c| c.push(child));
        parent.update_samplers(|s| s.push(AnimationSampler::default()));
        assert_eq!(parent.channel_count(), 1);

        parent.set_document(Some(doc), Seal);
        assert_eq!(parent.children()[0].document(), Some(doc));
        assert_eq!(parent.children()[0].sources()[0].document(), Some(doc));
        assert_eq!(parent.samplers()[0].document(), Some(doc));
    }

    #[test]
    fn test_sampler_lookup() {
        let mut animation = Animation::new();
        let mut sampler = AnimationSampler::default();
        sampler.id = Some("s1".to_string());
        sampler.inputs.push(Input::new(
            "INPUT".to_string(),
            Uri::parse("#times").unwrap(),
        ));
        animation.update_samplers(|s| s.push(sampler));

        let found = animation.sampler(&Uri::parse("#s1").unwrap()).unwrap();
        assert!(found.input("INPUT").is_some());
        assert!(found.input("OUTPUT").is_none());
    }
}

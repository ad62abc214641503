//! Pixel/framebuffer format negotiation.

use crate::error::{ErrorKind, Result};
use crate::host::{Host, HostFeatures};

/// The capability floor every candidate format must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTemplate {
    /// Size of each of the red, green and blue channels.
    ///
    /// By default `8` is picked.
    pub color_size: u8,

    /// The size of the alpha channel.
    ///
    /// By default `8` is picked.
    pub alpha_size: u8,

    /// Whether the back buffer must be double buffered.
    ///
    /// By default `true` is picked.
    pub double_buffer: bool,
}

impl FormatTemplate {
    /// Sum of the color channel sizes, `cColorBits` on WGL.
    pub fn color_bits(&self) -> u16 {
        u16::from(self.color_size) * 3
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        FormatTemplate { color_size: 8, alpha_size: 8, double_buffer: true }
    }
}

/// Builder for the [`FormatTemplate`].
#[derive(Debug, Default, Clone)]
pub struct FormatTemplateBuilder {
    template: FormatTemplate,
}

impl FormatTemplateBuilder {
    /// Create a new template builder with the default capability floor.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of bits for each color channel.
    #[inline]
    pub fn with_color_size(mut self, color_size: u8) -> Self {
        self.template.color_size = color_size;
        self
    }

    /// Number of bits for the alpha channel.
    #[inline]
    pub fn with_alpha_size(mut self, alpha_size: u8) -> Self {
        self.template.alpha_size = alpha_size;
        self
    }

    /// Whether a double buffered format is required.
    #[inline]
    pub fn with_double_buffer(mut self, double_buffer: bool) -> Self {
        self.template.double_buffer = double_buffer;
        self
    }

    /// Build the template.
    #[must_use]
    pub fn build(self) -> FormatTemplate {
        self.template
    }
}

/// Multisampling attributes of one candidate format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleInfo {
    /// `GLX_SAMPLE_BUFFERS`/`WGL_SAMPLE_BUFFERS_ARB`.
    pub sample_buffers: i32,
    /// `GLX_SAMPLES`/`WGL_SAMPLES_ARB`.
    pub samples: i32,
}

impl SampleInfo {
    /// Whether the candidate advertises multisampling.
    pub fn is_multisampled(&self) -> bool {
        self.sample_buffers != 0 && self.samples > 0
    }
}

/// Pick the candidate with the strict maximum sample count.
///
/// Ties keep the first enumerated candidate. Candidates whose attributes
/// can't be queried are skipped; without any multisampled candidate the first
/// surviving one is returned. `None` means nothing survived.
pub fn select_format<F>(
    candidates: &[F],
    mut query: impl FnMut(&F) -> Result<SampleInfo>,
) -> Option<usize> {
    let mut first_survivor = None;
    let mut best: Option<(usize, i32)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let info = match query(candidate) {
            Ok(info) => info,
            Err(err) => {
                log::warn!("skipping format candidate {index}: {err}");
                continue;
            },
        };

        first_survivor.get_or_insert(index);

        if !info.is_multisampled() {
            continue;
        }

        match best {
            Some((_, samples)) if info.samples <= samples => (),
            _ => best = Some((index, info.samples)),
        }
    }

    best.map(|(index, _)| index).or(first_survivor)
}

/// Run the legacy or the extended negotiation and realize the chosen format.
pub(crate) fn negotiate_format<H: Host>(
    host: &mut H,
    connection: H::Connection,
    features: HostFeatures,
    template: &FormatTemplate,
) -> Result<H::Format> {
    let candidate = if features.contains(HostFeatures::EXTENDED_FORMATS) {
        let candidates = host
            .enumerate_formats(connection, template)
            .map_err(|err| err.with_kind(ErrorKind::FormatUnavailable))?;

        let index = select_format(&candidates, |candidate| {
            host.query_samples(connection, *candidate)
        })
        .ok_or(ErrorKind::FormatUnavailable)?;

        log::debug!("picked format candidate {index} out of {}", candidates.len());
        candidates[index]
    } else {
        log::debug!("extended format queries are unavailable, using the legacy path");
        host.choose_legacy_format(connection, template)
            .map_err(|err| err.with_kind(ErrorKind::FormatUnavailable))?
    };

    host.realize_format(connection, candidate)
        .map_err(|err| err.with_kind(ErrorKind::FormatUnavailable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn samples(samples: &[i32]) -> Vec<SampleInfo> {
        samples
            .iter()
            .map(|&samples| SampleInfo { sample_buffers: (samples > 0) as i32, samples })
            .collect()
    }

    #[test]
    fn first_maximum_wins() {
        let candidates = samples(&[0, 4, 2, 4]);
        assert_eq!(select_format(&candidates, |info| Ok(*info)), Some(1));
    }

    #[test]
    fn falls_back_to_first_without_multisampling() {
        let candidates = samples(&[0, 0, 0]);
        assert_eq!(select_format(&candidates, |info| Ok(*info)), Some(0));
    }

    #[test]
    fn samples_without_sample_buffers_are_ignored() {
        let candidates = [
            SampleInfo { sample_buffers: 0, samples: 8 },
            SampleInfo { sample_buffers: 1, samples: 2 },
        ];
        assert_eq!(select_format(&candidates, |info| Ok(*info)), Some(1));
    }

    #[test]
    fn failed_queries_are_skipped() {
        let candidates = [None, Some(SampleInfo::default()), None, Some(samples(&[4])[0])];
        let query = |candidate: &Option<SampleInfo>| {
            candidate.ok_or_else(|| Error::from(ErrorKind::Misc))
        };
        assert_eq!(select_format(&candidates, query), Some(3));

        // Without multisampling the first survivor is used, not index 0.
        let candidates = [None, Some(SampleInfo::default()), Some(SampleInfo::default())];
        assert_eq!(select_format(&candidates, query), Some(1));
    }

    #[test]
    fn nothing_survives() {
        let candidates = [(), ()];
        assert_eq!(select_format(&candidates, |_| Err(ErrorKind::Misc.into())), None);
        assert_eq!(select_format::<()>(&[], |_| Ok(SampleInfo::default())), None);
    }

    #[test]
    fn template_builder() {
        let template =
            FormatTemplateBuilder::new().with_alpha_size(0).with_double_buffer(false).build();
        assert_eq!(template.alpha_size, 0);
        assert!(!template.double_buffer);
        assert_eq!(template.color_bits(), 24);
        assert_eq!(FormatTemplate::default(), FormatTemplateBuilder::new().build());
    }

    #[test]
    fn wide_channels_dont_overflow() {
        let template = FormatTemplateBuilder::new().with_color_size(100).build();
        assert_eq!(template.color_bits(), 300);
        let template = FormatTemplateBuilder::new().with_color_size(u8::MAX).build();
        assert_eq!(template.color_bits(), 765);
    }
}

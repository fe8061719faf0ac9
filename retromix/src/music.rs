//! Music substream adapter
//!
//! Owns the lifetime of the rendered music buffer; actual sample
//! consumption happens inside the mixing engine, one stereo pair per
//! output frame, wrapping circularly at the end of the buffer.

/// Identifier of a song known to the music synthesizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SongId(pub u16);

/// External music synthesizer seam
///
/// Renders a complete interleaved stereo 16-bit PCM buffer for a song
/// before playback starts. Rendering happens on the control path, never
/// from inside the mixing loop.
pub trait MusicSynth: Send {
    /// Render a song to interleaved stereo PCM, `None` if the song is unknown
    fn render(&self, song: SongId) -> Option<Vec<i16>>;
}

/// Circularly consumed music buffer
///
/// At most one buffer is bound at a time; binding a new one releases the
/// previous buffer.
#[derive(Debug, Default)]
pub struct MusicStream {
    pcm: Option<Vec<i16>>,
    cursor: usize,
}

impl MusicStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a rendered buffer, replacing any previous one
    ///
    /// An odd trailing sample would desync the stereo interleave and is
    /// dropped; a buffer shorter than one frame is treated as no music.
    pub fn bind(&mut self, mut pcm: Vec<i16>) {
        pcm.truncate(pcm.len() & !1);
        self.pcm = (!pcm.is_empty()).then_some(pcm);
        self.cursor = 0;
    }

    /// Stop playback and release the buffer
    pub fn release(&mut self) {
        self.pcm = None;
        self.cursor = 0;
    }

    pub fn is_bound(&self) -> bool {
        self.pcm.is_some()
    }

    /// Total bound length in samples (both channels), 0 when unbound
    pub fn len(&self) -> usize {
        self.pcm.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next interleaved stereo pair, wrapping past the end of the buffer
    #[inline]
    pub(crate) fn next_frame(&mut self) -> Option<(i32, i32)> {
        let pcm = self.pcm.as_ref()?;
        let left = pcm[self.cursor] as i32;
        let right = pcm[self.cursor + 1] as i32;
        self.cursor += 2;
        if self.cursor >= pcm.len() {
            self.cursor = 0;
        }
        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_pairs_then_wraps_to_start() {
        let mut music = MusicStream::new();
        music.bind(vec![1, 2, 3, 4]);

        assert_eq!(music.next_frame(), Some((1, 2)));
        assert_eq!(music.next_frame(), Some((3, 4)));
        // Wrap is seamless: next read restarts at offset 0
        assert_eq!(music.next_frame(), Some((1, 2)));
    }

    #[test]
    fn bind_replaces_previous_buffer_and_resets_cursor() {
        let mut music = MusicStream::new();
        music.bind(vec![1, 2, 3, 4]);
        music.next_frame();

        music.bind(vec![9, 8]);
        assert_eq!(music.next_frame(), Some((9, 8)));
    }

    #[test]
    fn odd_trailing_sample_is_dropped() {
        let mut music = MusicStream::new();
        music.bind(vec![1, 2, 3]);
        assert_eq!(music.len(), 2);
        assert_eq!(music.next_frame(), Some((1, 2)));
        assert_eq!(music.next_frame(), Some((1, 2)));
    }

    #[test]
    fn empty_or_sub_frame_buffer_is_silence() {
        let mut music = MusicStream::new();
        music.bind(Vec::new());
        assert!(!music.is_bound());
        assert_eq!(music.next_frame(), None);

        music.bind(vec![5]);
        assert!(!music.is_bound());
    }

    #[test]
    fn release_stops_playback() {
        let mut music = MusicStream::new();
        music.bind(vec![1, 2]);
        music.release();
        assert!(!music.is_bound());
        assert_eq!(music.next_frame(), None);
    }
}

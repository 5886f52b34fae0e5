use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

const SYMBOLS: [char; 6] = ['*', '+', 'o', '.', 'x', '~'];
const GRAVITY: f64 = 4.0;

/// One falling confetti piece
#[derive(Debug, Clone)]
pub struct ConfettiPiece {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
}

impl ConfettiPiece {
    fn spawn(width: f64, rng: &mut rand::rngs::ThreadRng) -> Self {
        Self {
            // Start just above the visible area so pieces rain in
            x: rng.gen_range(0.0..width.max(1.0)),
            y: rng.gen_range(-4.0..0.0),
            vel_x: rng.gen_range(-1.5..1.5),
            vel_y: rng.gen_range(2.0..6.0),
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
        }
    }

    fn update(&mut self, dt: f64) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
    }
}

/// Confetti rain shown after a flawless pass
#[derive(Debug)]
pub struct Confetti {
    pub pieces: Vec<ConfettiPiece>,
    pub start_time: SystemTime,
    pub duration: f64, // seconds
    pub is_active: bool,
    pub terminal_width: f64,
    pub terminal_height: f64,
}

impl Confetti {
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            start_time: SystemTime::now(),
            duration: 3.0,
            is_active: false,
            terminal_width: 80.0,
            terminal_height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.pieces.clear();
        self.start_time = SystemTime::now();
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;

        for _ in 0..60 {
            self.pieces.push(ConfettiPiece::spawn(width as f64, &mut rng));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let elapsed = self.start_time.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.duration {
            self.is_active = false;
            self.pieces.clear();
            return;
        }

        // Keep the rain going until shortly before the cutoff
        if elapsed < self.duration - 1.0 {
            let mut rng = rand::thread_rng();
            for _ in 0..4 {
                self.pieces
                    .push(ConfettiPiece::spawn(self.terminal_width, &mut rng));
            }
        }

        let dt = 0.1; // Fixed timestep for animation
        let width = self.terminal_width;
        let height = self.terminal_height;
        self.pieces.retain_mut(|piece| {
            piece.update(dt);
            let buffer = 2.0;
            piece.y <= height + buffer && piece.x >= -buffer && piece.x <= width + buffer
        });
    }
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_piece_falls_under_gravity() {
        let mut rng = rand::thread_rng();
        let mut piece = ConfettiPiece::spawn(80.0, &mut rng);
        let initial_y = piece.y;
        let initial_vel_y = piece.vel_y;

        piece.update(0.1);

        // Pieces always drift downward and pick up speed
        assert!(piece.y > initial_y);
        assert!(piece.vel_y > initial_vel_y);
    }

    #[test]
    fn test_pieces_spawn_along_the_top_edge() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let piece = ConfettiPiece::spawn(80.0, &mut rng);
            assert!(piece.x >= 0.0 && piece.x < 80.0);
            assert!(piece.y < 0.0);
            assert!(piece.vel_y > 0.0);
        }
    }

    #[test]
    fn test_inactive_until_started() {
        let confetti = Confetti::new();
        assert!(!confetti.is_active);
        assert!(confetti.pieces.is_empty());
    }

    #[test]
    fn test_start_fills_and_update_keeps_running() {
        let mut confetti = Confetti::new();
        confetti.start(80, 24);

        assert!(confetti.is_active);
        assert!(!confetti.pieces.is_empty());

        for _ in 0..10 {
            confetti.update();
        }

        // Still inside the 3 second window
        assert!(confetti.is_active);
        assert!(!confetti.pieces.is_empty());
    }

    #[test]
    fn test_deactivates_after_the_duration() {
        let mut confetti = Confetti::new();
        confetti.start(80, 24);
        confetti.start_time = SystemTime::now() - Duration::from_secs(4);

        confetti.update();

        assert!(!confetti.is_active);
        assert!(confetti.pieces.is_empty());
    }

    #[test]
    fn test_pieces_removed_once_off_screen() {
        let mut confetti = Confetti::new();
        confetti.start(20, 10);

        confetti.pieces.push(ConfettiPiece {
            x: 10.0,
            y: 100.0,
            vel_x: 0.0,
            vel_y: 1.0,
            symbol: '*',
            color_index: 0,
        });

        confetti.update();

        for piece in &confetti.pieces {
            assert!(piece.y <= 12.0, "piece at ({}, {}) survived", piece.x, piece.y);
        }
    }
}

//! Congratulation lines shown next to each winner.
//!
//! Purely cosmetic: a random pick from a fixed deck of templates, composed
//! once at commit time and stored on the winner record.

use rand::Rng;

/// Compose a congratulation line for one winner.
pub fn compose(winner_name: &str, prize_name: &str) -> String {
    let options = [
        format!("¡Felicidades {winner_name}! ¡Que disfrutes tu {prize_name} estas fiestas! 🎄✨"),
        format!("¡Enhorabuena {winner_name}! ¡{prize_name} es todo tuyo! 🎁🎅"),
        format!("¡Bravo {winner_name}! La suerte navideña te ha traído: {prize_name} ❄️⭐"),
    ];

    let mut rng = rand::rng();
    options[rng.random_range(0..options.len())].clone()
}

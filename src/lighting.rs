//! Scene lighting, fog and the day/night states.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::color::Rgb;

/// Distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fog {
    /// Ramps from clear at `near` to opaque at `far`.
    Linear { color: Rgb, near: f32, far: f32 },
    /// `1 - exp(-(density * d)^2)`.
    Exp2 { color: Rgb, density: f32 },
}

impl Fog {
    pub fn color(&self) -> Rgb {
        match *self {
            Fog::Linear { color, .. } | Fog::Exp2 { color, .. } => color,
        }
    }

    pub fn set_color(&mut self, new_color: Rgb) {
        match self {
            Fog::Linear { color, .. } | Fog::Exp2 { color, .. } => *color = new_color,
        }
    }

    /// How much of the fog color replaces the surface color at this distance (0..1).
    pub fn factor(&self, distance: f32) -> f32 {
        match *self {
            Fog::Linear { near, far, .. } => {
                if far <= near {
                    return if distance >= far { 1.0 } else { 0.0 };
                }
                ((distance - near) / (far - near)).clamp(0.0, 1.0)
            }
            Fog::Exp2 { density, .. } => {
                let d = density * distance;
                (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn apply(&self, surface: Rgb, distance: f32) -> Rgb {
        surface.lerp(self.color(), self.factor(distance))
    }
}

/// Ambient + hemisphere + one directional sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub hemi_sky: Rgb,
    pub hemi_ground: Rgb,
    pub hemi_intensity: f32,
    /// Unit vector pointing from the scene toward the sun.
    pub sun_direction: Vec3,
    pub sun_color: Rgb,
    pub sun_intensity: f32,
}

impl Lighting {
    /// Light reaching a surface with the given normal, before albedo.
    pub fn irradiance(&self, normal: Vec3) -> Rgb {
        let ambient = self.ambient_color.scale(self.ambient_intensity);
        let sky_weight = 0.5 * normal.y + 0.5;
        let hemi = self.hemi_ground.lerp(self.hemi_sky, sky_weight).scale(self.hemi_intensity);
        let lambert = normal.dot(self.sun_direction).max(0.0);
        let sun = self.sun_color.scale(self.sun_intensity * lambert);
        ambient.add(hemi).add(sun)
    }

    pub fn shade(&self, albedo: Rgb, normal: Vec3) -> Rgb {
        albedo.mul(self.irradiance(normal)).clamped()
    }
}

pub const DAY_SKY: u32 = 0x88ccff;
pub const NIGHT_SKY: u32 = 0x050510;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Night => "Night",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TimeOfDay::Day => TimeOfDay::Night,
            TimeOfDay::Night => TimeOfDay::Day,
        }
    }
}

/// Everything about the sky a frame needs: clear color, fog and lights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyState {
    pub background: Rgb,
    pub fog: Fog,
    pub lighting: Lighting,
}

impl SkyState {
    pub fn day() -> Self {
        let sky = Rgb::from_hex(DAY_SKY);
        Self {
            background: sky,
            fog: Fog::Linear { color: sky, near: 50.0, far: 400.0 },
            lighting: Lighting {
                ambient_color: Rgb::WHITE,
                ambient_intensity: 0.4,
                hemi_sky: Rgb::WHITE,
                hemi_ground: Rgb::from_hex(0x444444),
                hemi_intensity: 0.4,
                sun_direction: Vec3::new(100.0, 200.0, 100.0).normalize(),
                sun_color: Rgb::WHITE,
                sun_intensity: 1.2,
            },
        }
    }

    pub fn night() -> Self {
        let sky = Rgb::from_hex(NIGHT_SKY);
        let mut state = Self::day();
        state.background = sky;
        state.fog = Fog::Exp2 { color: sky, density: 0.005 };
        state.lighting.sun_intensity = 0.1;
        state.lighting.hemi_sky = Rgb::from_hex(0x111122);
        state.lighting.hemi_ground = Rgb::BLACK;
        state
    }

    pub fn for_time(time: TimeOfDay) -> Self {
        match time {
            TimeOfDay::Day => Self::day(),
            TimeOfDay::Night => Self::night(),
        }
    }

    /// Neon race: near-black sky with dense exponential fog.
    pub fn neon() -> Self {
        let sky = Rgb::from_hex(0x020205);
        Self {
            background: sky,
            fog: Fog::Exp2 { color: sky, density: 0.015 },
            lighting: Lighting {
                ambient_color: Rgb::WHITE,
                ambient_intensity: 0.8,
                hemi_sky: Rgb::BLACK,
                hemi_ground: Rgb::BLACK,
                hemi_intensity: 0.0,
                sun_direction: Vec3::Y,
                sun_color: Rgb::WHITE,
                sun_intensity: 0.5,
            },
        }
    }
}

/// Continuous sun orbit for the hamlet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayCycle {
    /// Radians of sun travel per unit of world time.
    pub speed: f32,
    /// Current sun angle; 0 is sunrise, PI/2 noon, PI sunset.
    pub angle: f32,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self {
            speed: 0.6,
            angle: PI / 3.0,
        }
    }
}

impl DayCycle {
    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + dt * self.speed).rem_euclid(TAU);
    }

    /// Jump half a day ahead.
    pub fn skip_half(&mut self) {
        self.angle = (self.angle + PI).rem_euclid(TAU);
    }

    /// Sun height in -1..1.
    pub fn sun_height(&self) -> f32 {
        self.angle.sin()
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        if self.sun_height() > 0.0 {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    /// Sky blended between the night and day palettes by sun height.
    pub fn sky(&self) -> SkyState {
        let day = SkyState::day();
        let night = SkyState::night();
        let height = self.sun_height();
        // twilight band around the horizon
        let t = ((height + 0.2) / 0.5).clamp(0.0, 1.0);

        let background = night.background.lerp(day.background, t);
        let mut lighting = day.lighting;
        lighting.sun_direction = Vec3::new(self.angle.cos(), height.max(0.05), 0.5).normalize();
        lighting.sun_intensity = height.max(0.0) * 1.2;
        lighting.hemi_sky = night.lighting.hemi_sky.lerp(day.lighting.hemi_sky, t);
        lighting.hemi_ground = night.lighting.hemi_ground.lerp(day.lighting.hemi_ground, t);
        lighting.ambient_intensity = 0.15 + 0.25 * t;
        // warm low sun
        lighting.sun_color = Rgb::from_hex(0xffaa66).lerp(Rgb::WHITE, (height * 2.0).clamp(0.0, 1.0));

        // one fog kind all cycle long; only its color follows the sky
        let fog = Fog::Linear { color: background, near: 50.0, far: 400.0 };

        SkyState { background, fog, lighting }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fog_ramp() {
        let fog = Fog::Linear { color: Rgb::WHITE, near: 50.0, far: 400.0 };
        assert_eq!(fog.factor(10.0), 0.0);
        assert_eq!(fog.factor(500.0), 1.0);
        assert!((fog.factor(225.0) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_exp2_fog_grows_with_distance() {
        let fog = Fog::Exp2 { color: Rgb::BLACK, density: 0.015 };
        assert_eq!(fog.factor(0.0), 0.0);
        assert!(fog.factor(50.0) < fog.factor(100.0));
        assert!(fog.factor(1000.0) > 0.99);
    }

    #[test]
    fn test_toggle_cycles_labels() {
        let t = TimeOfDay::Day.toggled();
        assert_eq!(t.label(), "Night");
        assert_eq!(t.toggled(), TimeOfDay::Day);
    }

    #[test]
    fn test_night_is_darker() {
        let day = SkyState::day();
        let night = SkyState::night();
        let up = Vec3::Y;
        let d = day.lighting.irradiance(up);
        let n = night.lighting.irradiance(up);
        assert!(n.r + n.g + n.b < d.r + d.g + d.b);
        assert_eq!(night.lighting.sun_intensity, 0.1);
        assert_eq!(night.background, Rgb::from_hex(NIGHT_SKY));
        assert!(matches!(night.fog, Fog::Exp2 { density, .. } if density == 0.005));
    }

    #[test]
    fn test_faces_away_from_sun_get_no_direct_light() {
        let lighting = SkyState::day().lighting;
        let away = -lighting.sun_direction;
        let lit = lighting.irradiance(lighting.sun_direction);
        let unlit = lighting.irradiance(away);
        assert!(lit.r > unlit.r + 1.0);
    }

    #[test]
    fn test_day_cycle_noon_and_midnight() {
        let mut cycle = DayCycle { speed: 1.0, angle: PI / 2.0 };
        assert_eq!(cycle.time_of_day(), TimeOfDay::Day);
        assert!((cycle.sky().lighting.sun_intensity - 1.2).abs() < 1e-4);
        cycle.skip_half();
        assert_eq!(cycle.time_of_day(), TimeOfDay::Night);
        assert_eq!(cycle.sky().lighting.sun_intensity, 0.0);
        assert_eq!(cycle.sky().background, Rgb::from_hex(NIGHT_SKY));
    }

    #[test]
    fn test_day_cycle_fog_changes_smoothly() {
        let steps = 2000;
        let distance = 173.0;
        let mut cycle = DayCycle { speed: 1.0, angle: 0.0 };
        let mut last = cycle.sky().fog.factor(distance);
        let mut max_jump = 0.0f32;
        for _ in 0..steps {
            cycle.advance(TAU / steps as f32);
            let factor = cycle.sky().fog.factor(distance);
            max_jump = max_jump.max((factor - last).abs());
            last = factor;
        }
        assert!(max_jump < 0.01, "fog factor jumped by {max_jump}");
    }
}

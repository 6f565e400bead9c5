//! Page regions and their animation plan.
//!
//! A page hands its rendered elements over as `PageRegions`; any region it
//! chose not to render is `None`. `home_plan` pairs each region with its
//! recipe, and `RegionMount` keeps exactly one live scope for them.

use folio_core::{ElementId, Region};
use folio_motion::{Direction, LifecycleManager, Recipe, ScopeHandle};

/// Logical region names, in registration order.
pub const REGION_NAMES: [&str; 13] = [
    "hero", "fade", "scale", "parallax", "stagger", "progress", "image1", "image2", "image3",
    "image4", "marquee", "signature", "circular",
];

/// Rendered elements of a page, by logical region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRegions {
    pub hero: Option<Region>,
    pub fade: Option<Region>,
    pub scale: Option<Region>,
    pub parallax: Option<Region>,
    pub stagger: Option<Region>,
    pub progress: Option<Region>,
    pub images: [Option<Region>; 4],
    pub marquee: Option<Region>,
    /// Signature SVG; children are its paths.
    pub signature: Option<Region>,
    /// Circular text badge.
    pub circular: Option<Region>,
}

impl PageRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a region up by logical name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.slot(name)?.as_ref()
    }

    /// Set a region by logical name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, region: Option<Region>) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = region;
                true
            }
            None => false,
        }
    }

    /// Names of the regions that are present.
    pub fn present(&self) -> Vec<&'static str> {
        REGION_NAMES
            .iter()
            .copied()
            .filter(|name| self.get(name).is_some())
            .collect()
    }

    /// Every element of every present region, owners and children.
    pub fn elements(&self) -> Vec<ElementId> {
        REGION_NAMES
            .iter()
            .filter_map(|name| self.get(name))
            .flat_map(|r| std::iter::once(r.element).chain(r.children.iter().copied()))
            .collect()
    }

    fn slot(&self, name: &str) -> Option<&Option<Region>> {
        Some(match name {
            "hero" => &self.hero,
            "fade" => &self.fade,
            "scale" => &self.scale,
            "parallax" => &self.parallax,
            "stagger" => &self.stagger,
            "progress" => &self.progress,
            "image1" => &self.images[0],
            "image2" => &self.images[1],
            "image3" => &self.images[2],
            "image4" => &self.images[3],
            "marquee" => &self.marquee,
            "signature" => &self.signature,
            "circular" => &self.circular,
            _ => return None,
        })
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<Region>> {
        Some(match name {
            "hero" => &mut self.hero,
            "fade" => &mut self.fade,
            "scale" => &mut self.scale,
            "parallax" => &mut self.parallax,
            "stagger" => &mut self.stagger,
            "progress" => &mut self.progress,
            "image1" => &mut self.images[0],
            "image2" => &mut self.images[1],
            "image3" => &mut self.images[2],
            "image4" => &mut self.images[3],
            "marquee" => &mut self.marquee,
            "signature" => &mut self.signature,
            "circular" => &mut self.circular,
            _ => return None,
        })
    }
}

/// Recipes of the home page, one per region.
pub fn home_plan(regions: &PageRegions) -> Vec<(Option<Region>, Recipe)> {
    let mut plan = vec![
        (regions.hero.clone(), Recipe::HeroEntrance),
        (regions.fade.clone(), Recipe::FadeUp),
        (regions.scale.clone(), Recipe::ScaleUp),
        (
            regions.parallax.clone(),
            Recipe::VerticalParallax {
                distance: 200.0,
                smoothing: None,
            },
        ),
        (regions.stagger.clone(), Recipe::StaggeredChildrenFade),
        (regions.progress.clone(), Recipe::VerticalProgressFill),
    ];
    plan.extend(
        regions
            .images
            .iter()
            .enumerate()
            .map(|(i, image)| (image.clone(), Recipe::image_parallax(i))),
    );
    plan.push((regions.marquee.clone(), Recipe::marquee(Direction::Left)));
    plan.push((regions.signature.clone(), Recipe::SignatureDraw));
    plan.push((regions.circular.clone(), Recipe::circular_text()));
    plan
}

/// Keeps at most one live scope for a page's regions.
pub struct RegionMount {
    manager: LifecycleManager,
    scope: Option<ScopeHandle>,
}

impl RegionMount {
    pub fn new(manager: LifecycleManager) -> Self {
        Self {
            manager,
            scope: None,
        }
    }

    /// Register the page's bindings, releasing any previous mount first.
    pub fn mount(&mut self, regions: &PageRegions) -> usize {
        self.unmount();
        let handle = self.manager.register(home_plan(regions));
        let count = self.manager.registry().binding_count(handle.id());
        tracing::info!("Mounted {} regions with {} bindings", regions.present().len(), count);
        self.scope = Some(handle);
        count
    }

    /// Release the current mount. Returns the number of bindings released.
    pub fn unmount(&mut self) -> usize {
        self.scope.take().map(|h| h.release()).unwrap_or(0)
    }

    pub fn is_mounted(&self) -> bool {
        self.scope.as_ref().is_some_and(|h| h.is_live())
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }
}

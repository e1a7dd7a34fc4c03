use super::next_pow2;
use crate::model::Rect;
use tracing::trace;

/// A region of the sheet, either free or occupied by one block.
/// A used node owns the two leftover regions created when it was split or grown.
#[derive(Debug, Default)]
pub struct Node {
    pub rect: Rect,
    pub used: bool,
    pub down: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    fn free(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            ..Default::default()
        }
    }

    /// Depth-first search for the first free node that holds `w x h`.
    /// Used nodes are searched right first, then down.
    fn find(&mut self, w: u32, h: u32) -> Option<&mut Node> {
        if self.used {
            if let Some(right) = self.right.as_deref_mut() {
                if let Some(found) = right.find(w, h) {
                    return Some(found);
                }
            }
            self.down.as_deref_mut().and_then(|down| down.find(w, h))
        } else if w <= self.rect.w && h <= self.rect.h {
            Some(self)
        } else {
            None
        }
    }

    /// Occupies the top-left `w x h` of this node and returns that rectangle.
    fn split(&mut self, w: u32, h: u32) -> Rect {
        let r = self.rect;
        self.used = true;
        self.down = Some(Box::new(Node::free(r.x, r.y + h, r.w, r.h - h)));
        self.right = Some(Box::new(Node::free(r.x + w, r.y, r.w - w, h)));
        Rect::new(r.x, r.y, w, h)
    }

    /// Appends the leaf regions under this node to `out`.
    pub fn leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        if !self.used {
            out.push(self);
            return;
        }
        if let Some(right) = self.right.as_deref() {
            right.leaves(out);
        }
        if let Some(down) = self.down.as_deref() {
            down.leaves(out);
        }
    }
}

/// Limits the tree may grow within. `border` is the normalized border padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub border: u32,
    pub shape_padding: u32,
    pub power_of_two: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grow {
    Right,
    Down,
}

/// Binary-tree packer whose root starts at the first block's size and grows
/// right or down on demand, keeping the sheet close to square.
pub struct GrowingPacker {
    limits: GrowLimits,
    root: Box<Node>,
}

impl GrowingPacker {
    /// Starts with a root sized `first` (usually the first block), or empty.
    pub fn new(limits: GrowLimits, first: Option<(u32, u32)>) -> Self {
        let (w, h) = first.unwrap_or((0, 0));
        Self {
            limits,
            root: Box::new(Node::free(0, 0, w, h)),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Current size of the root region.
    pub fn size(&self) -> (u32, u32) {
        (self.root.rect.w, self.root.rect.h)
    }

    /// Places a `w x h` block and returns its rectangle in tree coordinates
    /// (no border offset), or `None` if it fits neither the tree nor any growth.
    pub fn pack(&mut self, w: u32, h: u32) -> Option<Rect> {
        if let Some(node) = self.root.find(w, h) {
            return Some(node.split(w, h));
        }
        let dir = self.grow_direction(w, h)?;
        self.grow(dir, w, h);
        self.root.find(w, h).map(|node| node.split(w, h))
    }

    fn grow_direction(&self, w: u32, h: u32) -> Option<Grow> {
        let GrowLimits {
            max_width,
            max_height,
            border,
            shape_padding,
            power_of_two,
        } = self.limits;
        let root = self.root.rect;
        let border2 = border.saturating_mul(2);
        let grown_w = root.w.saturating_add(w).saturating_add(border2);
        let grown_h = root.h.saturating_add(h).saturating_add(border2);

        // Growing right needs the block to span no more than the current height; down mirrors it.
        let mut can_grow_down = w <= root.w;
        let mut can_grow_right = h <= root.h;

        let mut should_grow_right = can_grow_right && root.h >= root.w.saturating_add(w);
        let mut should_grow_down = can_grow_down && root.w >= root.h.saturating_add(h);

        if power_of_two {
            let pot = next_pow2(root.w)
                .saturating_add(border2)
                .saturating_sub(shape_padding);
            if grown_w > pot && grown_h <= pot.saturating_mul(2) && can_grow_down {
                should_grow_down = true;
                should_grow_right = false;
            }
        }
        if grown_w > max_width {
            should_grow_right = false;
            can_grow_right = false;
        }
        if grown_h > max_height {
            should_grow_down = false;
            can_grow_down = false;
        }

        let dir = if should_grow_right {
            Some(Grow::Right)
        } else if should_grow_down {
            Some(Grow::Down)
        } else if can_grow_right {
            Some(Grow::Right)
        } else if can_grow_down {
            Some(Grow::Down)
        } else {
            None
        };
        trace!(
            w,
            h,
            root_w = root.w,
            root_h = root.h,
            ?dir,
            "grow decision"
        );
        dir
    }

    /// Replaces the root with a larger one that owns the old root and the new strip.
    fn grow(&mut self, dir: Grow, w: u32, h: u32) {
        let old = std::mem::take(&mut self.root);
        let r = old.rect;
        self.root = Box::new(match dir {
            Grow::Right => Node {
                rect: Rect::new(0, 0, r.w + w, r.h),
                used: true,
                down: Some(old),
                right: Some(Box::new(Node::free(r.w, 0, w, r.h))),
            },
            Grow::Down => Node {
                rect: Rect::new(0, 0, r.w, r.h + h),
                used: true,
                down: Some(Box::new(Node::free(0, r.h, r.w, h))),
                right: Some(old),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max: u32) -> GrowLimits {
        GrowLimits {
            max_width: max,
            max_height: max,
            border: 0,
            shape_padding: 0,
            power_of_two: false,
        }
    }

    fn assert_leaves_partition(packer: &GrowingPacker) {
        let mut leaves = Vec::new();
        packer.root().leaves(&mut leaves);
        let root = packer.root().rect;
        let mut covered = 0u64;
        for leaf in &leaves {
            assert!(root.contains(&leaf.rect), "leaf {:?} outside root {:?}", leaf.rect, root);
            covered += leaf.rect.area();
        }
        // used blocks are the leaves' complement; count them through the tree
        covered += used_area(packer.root());
        assert_eq!(covered, root.area());
        for i in 0..leaves.len() {
            for j in (i + 1)..leaves.len() {
                assert!(!leaves[i].rect.intersects(&leaves[j].rect));
            }
        }
    }

    // Area occupied by blocks: a used node's rect minus its two children.
    fn used_area(node: &Node) -> u64 {
        if !node.used {
            return 0;
        }
        let children: u64 = [node.right.as_deref(), node.down.as_deref()]
            .into_iter()
            .flatten()
            .map(|c| c.rect.area())
            .sum();
        let own = node.rect.area().saturating_sub(children);
        own + node.right.as_deref().map_or(0, used_area) + node.down.as_deref().map_or(0, used_area)
    }

    #[test]
    fn split_places_at_node_origin() {
        let mut p = GrowingPacker::new(limits(100), Some((10, 10)));
        assert_eq!(p.pack(10, 10), Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(p.size(), (10, 10));
    }

    #[test]
    fn grows_right_when_taller_is_not_preferred() {
        let mut p = GrowingPacker::new(limits(100), Some((10, 10)));
        p.pack(10, 10);
        assert_eq!(p.pack(5, 5), Some(Rect::new(10, 0, 5, 5)));
        assert_eq!(p.size(), (15, 10));
        // next 5x5 goes below the previous one inside the grown strip
        assert_eq!(p.pack(5, 5), Some(Rect::new(10, 5, 5, 5)));
        assert_eq!(p.size(), (15, 10));
    }

    #[test]
    fn grows_down_when_wide() {
        let mut p = GrowingPacker::new(limits(100), Some((20, 5)));
        p.pack(20, 5);
        assert_eq!(p.pack(10, 5), Some(Rect::new(0, 5, 10, 5)));
        assert_eq!(p.size(), (20, 10));
    }

    #[test]
    fn refuses_growth_past_max() {
        let mut p = GrowingPacker::new(limits(12), Some((10, 10)));
        p.pack(10, 10);
        assert_eq!(p.pack(5, 5), None);
        assert_eq!(p.size(), (10, 10));
    }

    #[test]
    fn pow2_prefers_down_before_crossing_boundary() {
        let mut lim = limits(1024);
        lim.power_of_two = true;
        let mut p = GrowingPacker::new(lim, Some((60, 60)));
        p.pack(60, 60);
        // right would reach 70 > 64; down stays within 2 * 64
        assert_eq!(p.pack(10, 10), Some(Rect::new(0, 60, 10, 10)));
        assert_eq!(p.size(), (60, 70));
    }

    #[test]
    fn tree_leaves_partition_root() {
        let mut p = GrowingPacker::new(limits(256), Some((32, 32)));
        let sizes = [(32, 32), (20, 8), (8, 20), (16, 16), (30, 5), (5, 30), (12, 12), (3, 3)];
        for (w, h) in sizes {
            assert!(p.pack(w, h).is_some());
            assert_leaves_partition(&p);
        }
    }
}

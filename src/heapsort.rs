/// Sorts `v` using heapsort, which guarantees *O*(*n* \* log(*n*)) worst-case.
///
/// Only used once a branch of the quicksort ran out of recursion budget, so it stays scalar.
/// Lanes are plain `Copy` integers and comparing them can't panic, so the heap is sifted by value
/// without a drop guard for the hole.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub(crate) fn heapsort<L: Ord + Copy>(v: &mut [L]) {
    for node in (0..v.len() / 2).rev() {
        sift_down(v, node);
    }

    for end in (1..v.len()).rev() {
        v.swap(0, end);
        sift_down(&mut v[..end], 0);
    }
}

/// Moves `heap[node]` down until no child is greater, shifting the greater children up in its
/// place. The max heap property must already hold below `node`.
#[inline]
fn sift_down<L: Ord + Copy>(heap: &mut [L], mut node: usize) {
    let x = heap[node];
    let len = heap.len();

    loop {
        let left = 2 * node + 1;
        if left >= len {
            break;
        }
        let child = if left + 1 < len && heap[left] < heap[left + 1] {
            left + 1
        } else {
            left
        };
        if x >= heap[child] {
            break;
        }

        heap[node] = heap[child];
        node = child;
    }

    heap[node] = x;
}

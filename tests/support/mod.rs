use std::collections::HashMap;

/// Executes the instruction subset emitted by the generator and returns the
/// value of `%eax` at `ret`.
pub fn run_asm(asm: &str) -> i32 {
    let lines = asm
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let labels = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.strip_suffix(':').map(|label| (label, i)))
        .collect::<HashMap<_, _>>();

    let mut eax: i32 = 0;
    let mut ecx: i32 = 0;
    let mut edx: i32 = 0;
    let mut stack = Vec::new();
    // operands of the last cmpl, as (dst, src)
    let mut flags = (0i32, 0i32);
    let mut pc = 0;

    loop {
        let line = lines[pc];
        pc += 1;
        if line.ends_with(':') || line.starts_with('.') {
            continue;
        }
        let (op, args) = line.split_once(' ').unwrap_or((line, ""));
        match (op, args) {
            ("movl", "%edx, %eax") => eax = edx,
            ("movl", args) => {
                let imm = args
                    .strip_prefix('$')
                    .and_then(|rest| rest.strip_suffix(", %eax"))
                    .unwrap_or_else(|| panic!("unsupported movl: {}", line));
                eax = imm.parse().unwrap();
            }
            ("pushl", "%eax") => stack.push(eax),
            ("popl", "%ecx") => ecx = stack.pop().expect("pop from empty stack"),
            ("negl", "%eax") => eax = eax.wrapping_neg(),
            ("notl", "%eax") => eax = !eax,
            ("addl", "%ecx, %eax") => eax = eax.wrapping_add(ecx),
            ("subl", "%ecx, %eax") => eax = eax.wrapping_sub(ecx),
            ("imull", "%ecx, %eax") => eax = eax.wrapping_mul(ecx),
            ("andl", "%ecx, %eax") => eax &= ecx,
            ("orl", "%ecx, %eax") => eax |= ecx,
            ("xorl", "%ecx, %eax") => eax ^= ecx,
            ("shll", "%cl, %eax") => eax = eax.wrapping_shl(ecx as u32 & 31),
            ("sarl", "%cl, %eax") => eax = eax.wrapping_shr(ecx as u32 & 31),
            ("cdq", "") => edx = if eax < 0 { -1 } else { 0 },
            ("idivl", "%ecx") => {
                let dividend = eax;
                eax = dividend.wrapping_div(ecx);
                edx = dividend.wrapping_rem(ecx);
            }
            ("cmpl", "$0, %eax") => flags = (eax, 0),
            ("cmpl", "%eax, %ecx") => flags = (ecx, eax),
            (set, "%al") if set.starts_with("set") => {
                let (dst, src) = flags;
                let bit = match set {
                    "sete" => dst == src,
                    "setne" => dst != src,
                    "setl" => dst < src,
                    "setle" => dst <= src,
                    "setg" => dst > src,
                    "setge" => dst >= src,
                    _ => panic!("unsupported {}", set),
                };
                eax = (eax & !0xff) | bit as i32;
            }
            ("jmp", label) => pc = labels[label],
            ("je", label) if flags.0 == flags.1 => pc = labels[label],
            ("jne", label) if flags.0 != flags.1 => pc = labels[label],
            ("je", _) | ("jne", _) => {}
            ("ret", "") => return eax,
            _ => panic!("unsupported instruction: {}", line),
        }
    }
}
